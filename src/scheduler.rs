//! The sampling loop.
//!
//! Each tick runs to completion before the next one starts:
//! rotation check, process resolution, one sample per matched process,
//! aggregation. The loop stops only when the shared running flag is cleared,
//! after which [`Sampler::finish`] writes everything that was collected.

use crate::collector::{self, ProcessSource};
use crate::config::{Config, MemoryMetric};
use crate::core::{Aggregator, Sample, Window, WindowManager};
use crate::export::{self, FlushReport};
use crate::stats::SessionStats;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep while waiting for the next tick.
const STOP_POLL: Duration = Duration::from_millis(100);

/// What a single tick did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Folder of the window opened by this tick, if any
    pub opened: Option<PathBuf>,
    pub recorded: usize,
    pub missed: usize,
}

/// Drives resolution, sampling and aggregation at a fixed cadence.
pub struct Sampler<S: ProcessSource> {
    source: S,
    metric: MemoryMetric,
    tick_interval: Duration,
    windows: WindowManager,
    aggregator: Aggregator,
    stats: SessionStats,
}

impl<S: ProcessSource> Sampler<S> {
    /// Create a sampler whose first window opens at `now`.
    pub fn new(source: S, config: &Config, now: DateTime<Local>) -> Self {
        let mut windows = WindowManager::new(
            config.window_duration,
            config.watch.clone(),
            config.output_root.clone(),
        );
        let mut aggregator = Aggregator::new();
        aggregator.open(windows.open(now));

        let mut stats = SessionStats::new(now);
        stats.windows_opened = 1;

        Self {
            source,
            metric: config.metric,
            tick_interval: config.tick_interval,
            windows,
            aggregator,
            stats,
        }
    }

    /// Open a new window if the current one expired.
    fn rotate(&mut self, now: DateTime<Local>) -> Option<PathBuf> {
        let window = self.windows.maybe_rotate(now)?;
        let folder = window.folder.clone();
        self.aggregator.open(window);
        self.stats.windows_opened += 1;
        Some(folder)
    }

    /// Run one sampling pass stamped with `now`.
    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        let mut outcome = TickOutcome {
            opened: self.rotate(now),
            ..TickOutcome::default()
        };

        for entry in collector::resolve(&self.source, self.windows.watch()) {
            match collector::sample(&self.source, entry.pid, self.metric) {
                Some(usage_kb) => {
                    if self.aggregator.record(&entry.name, Sample::at(now, usage_kb)) {
                        outcome.recorded += 1;
                    }
                }
                None => outcome.missed += 1,
            }
        }

        self.stats.ticks += 1;
        self.stats.samples_recorded += outcome.recorded as u64;
        self.stats.samples_missed += outcome.missed as u64;
        outcome
    }

    /// Tick until `running` is cleared.
    ///
    /// The flag is checked between ticks only; a tick in progress always
    /// completes.
    pub fn run(&mut self, running: &AtomicBool) {
        if let Some(window) = self.aggregator.current() {
            announce_window(&window.folder);
        }

        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            let outcome = self.tick(Local::now());

            if let Some(folder) = &outcome.opened {
                announce_window(folder);
            }
            tracing::debug!(
                recorded = outcome.recorded,
                missed = outcome.missed,
                "tick complete"
            );

            sleep_until(started + self.tick_interval, running);
        }
    }

    /// Write every window and return the flush report with final statistics.
    pub fn finish(mut self) -> (FlushReport, SessionStats) {
        let report = export::flush(self.aggregator.windows());
        self.stats.files_written = report.written.len() as u64;
        self.stats.write_failures = report.failures.len() as u64;
        (report, self.stats)
    }

    pub fn windows(&self) -> &[Window] {
        self.aggregator.windows()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

/// Create a window's folder and tell the operator where data will go.
pub fn announce_window(folder: &Path) {
    if let Err(e) = std::fs::create_dir_all(folder) {
        tracing::warn!("Could not create {}: {e}", folder.display());
    }
    println!("Data will be saved in the following folder:");
    println!("{}", folder.display());
}

/// Sleep until `deadline`, waking early if `running` is cleared.
fn sleep_until(deadline: Instant, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}
