//! In-memory store of every window opened during a run.
//!
//! Only the newest window receives samples; older ones stay untouched until
//! the final flush.

use crate::core::windowing::{Sample, Window};

#[derive(Debug, Default)]
pub struct Aggregator {
    windows: Vec<Window>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `window` the current window.
    pub fn open(&mut self, window: Window) {
        self.windows.push(window);
    }

    /// Append a sample to `app`'s bucket in the current window.
    ///
    /// Returns false when no window is open or `app` is not watched.
    pub fn record(&mut self, app: &str, sample: Sample) -> bool {
        match self.windows.last_mut() {
            Some(window) => window.push(app, sample),
            None => false,
        }
    }

    pub fn current(&self) -> Option<&Window> {
        self.windows.last()
    }

    /// Every window, oldest first.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn sample_count(&self) -> usize {
        self.windows.iter().map(Window::sample_count).sum()
    }
}
