//! Counters describing what a run collected.

use chrono::{DateTime, Local};

/// Session statistics, updated by the sampling loop.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Sampling ticks executed
    pub ticks: u64,
    /// Samples appended to a window
    pub samples_recorded: u64,
    /// Matched processes that could not be sampled
    pub samples_missed: u64,
    /// Windows opened, including the first
    pub windows_opened: u64,
    /// Files written by the final flush
    pub files_written: u64,
    /// Files that failed to write
    pub write_failures: u64,
    pub session_start: DateTime<Local>,
}

impl SessionStats {
    pub fn new(session_start: DateTime<Local>) -> Self {
        Self {
            ticks: 0,
            samples_recorded: 0,
            samples_missed: 0,
            windows_opened: 0,
            files_written: 0,
            write_failures: 0,
            session_start,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self, now: DateTime<Local>) -> String {
        format!(
            "Session Statistics:\n\
             - Ticks: {}\n\
             - Samples recorded: {}\n\
             - Samples missed: {}\n\
             - Windows opened: {}\n\
             - Files written: {}\n\
             - Write failures: {}\n\
             - Session duration: {} seconds",
            self.ticks,
            self.samples_recorded,
            self.samples_missed,
            self.windows_opened,
            self.files_written,
            self.write_failures,
            (now - self.session_start).num_seconds().max(0)
        )
    }
}
