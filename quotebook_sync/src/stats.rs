//! Running totals of sync activity, logged when the daemon stops.
use quotebook_common::sync::SyncEvent;

/// Counters accumulated from [`SyncEvent`]s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    /// Completed fetch rounds.
    pub fetches: usize,
    /// Quotes added by merges.
    pub merged: usize,
    /// Quotes accepted by the remote endpoint.
    pub pushed: usize,
    /// Individual push requests that failed.
    pub push_failures: usize,
    /// Rounds that failed as a whole.
    pub failures: usize,
}

impl SyncStats {
    /// Folds one event into the totals.
    pub fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Merged(added) => {
                self.fetches += 1;
                self.merged += added;
            }
            SyncEvent::Pushed(report) => {
                self.pushed += report.sent;
                self.push_failures += report.failed;
            }
            SyncEvent::Failed(_) => self.failures += 1,
        }
    }
}
