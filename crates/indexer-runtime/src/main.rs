//! # Auction Indexer
//!
//! Entry point: load settings, seed state from the chain snapshot, then
//! replay every new block until Ctrl+C or a fatal error.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags (`AUCTION_INDEXER_*` env fallbacks) and validate them
//! 2. Install the tracing subscriber (`RUST_LOG` overrides `--log-filter`)
//! 3. Load the snapshot; any failure exits non-zero
//! 4. Run the reconciliation loop
//! 5. On Ctrl+C, signal shutdown and wait for the loop to return

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use indexer_runtime::{CliArgs, IndexerRuntime};

fn init_tracing(fallback_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback_filter)
            .with_context(|| format!("invalid log filter {:?}", fallback_filter))?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = CliArgs::parse()
        .into_settings()
        .context("invalid configuration")?;
    init_tracing(&settings.log_filter)?;

    let runtime = IndexerRuntime::new(settings);
    let mut handle = runtime
        .start()
        .await
        .context("failed to load the auction snapshot")?;

    info!("Indexer is running. Press Ctrl+C to stop.");

    let finished = tokio::select! {
        joined = &mut handle => Some(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            None
        }
    };
    let joined = match finished {
        Some(joined) => joined,
        None => {
            runtime.shutdown();
            handle.await
        }
    };

    let (result, stats) = joined.context("reconciliation task panicked")?;
    info!(
        "Final stats: {}",
        serde_json::to_string(&stats).context("failed to encode stats")?
    );
    result.context("reconciliation loop failed")?;

    Ok(())
}
