//! Event log sinks.

use parking_lot::Mutex;
use tracing::info;

use crate::domain::{format_event_line, format_summary_line, AppliedEvent, Bid};
use crate::ports::Reporter;

/// `tracing` target of the event log, so it can be filtered on its own.
pub const EVENT_LOG_TARGET: &str = "auction_indexer::events";

/// Writes every line as an `INFO` event on [`EVENT_LOG_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a reporter.
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn event_applied(&self, height: u64, event: &AppliedEvent) {
        info!(target: EVENT_LOG_TARGET, height, "{}", format_event_line(height, event));
    }

    fn highest_bid(&self, height: u64, auction_id: u64, bid: &Bid) {
        info!(
            target: EVENT_LOG_TARGET,
            height,
            auction_id,
            "{}",
            format_summary_line(height, auction_id, bid)
        );
    }
}

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<String>,
    summaries: Vec<String>,
}

/// Keeps every line in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    recorded: Mutex<Recorded>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Event lines so far.
    pub fn event_lines(&self) -> Vec<String> {
        self.recorded.lock().events.clone()
    }

    /// Summary lines so far.
    pub fn summary_lines(&self) -> Vec<String> {
        self.recorded.lock().summaries.clone()
    }
}

impl Reporter for RecordingReporter {
    fn event_applied(&self, height: u64, event: &AppliedEvent) {
        self.recorded
            .lock()
            .events
            .push(format_event_line(height, event));
    }

    fn highest_bid(&self, height: u64, auction_id: u64, bid: &Bid) {
        self.recorded
            .lock()
            .summaries
            .push(format_summary_line(height, auction_id, bid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid() -> Bid {
        Bid {
            creator: "bob".into(),
            auction_id: 0,
            bid_price: "150".into(),
            id: 0,
        }
    }

    #[test]
    fn test_recording_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.event_applied(11, &AppliedEvent::BidPlaced(bid()));
        reporter.event_applied(
            12,
            &AppliedEvent::AuctionFinalized {
                creator: "alice".into(),
                auction_id: 0,
                auction: None,
                winning_bid: Some(bid()),
            },
        );
        reporter.highest_bid(100, 0, &bid());

        let events = reporter.event_lines();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("[11] [bob]"));
        assert!(events[1].starts_with("[12] [alice]"));
        assert_eq!(
            reporter.summary_lines(),
            vec!["[100] | Current Highest Bid for Auction ID: 0 is 150 By: bob".to_string()]
        );
    }

    #[test]
    fn test_tracing_reporter_without_subscriber() {
        let reporter = TracingReporter::new();
        reporter.event_applied(1, &AppliedEvent::BidPlaced(bid()));
        reporter.highest_bid(100, 0, &bid());
    }
}
