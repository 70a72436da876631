//! Process discovery and memory sampling.
//!
//! Each supported OS provides a [`ProcessSource`]; [`resolve`] and [`sample`]
//! sit on top of it and absorb every expected failure so the sampling loop
//! never sees an error.

pub mod types;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub mod noop;

#[cfg(test)]
pub(crate) mod scripted;

// Re-export commonly used types
pub use types::{CollectorError, MemoryCounters, ProcessEntry, ProcessSource};

#[cfg(target_os = "windows")]
pub use windows::WindowsSource;

/// Process source for the host OS
#[cfg(target_os = "windows")]
pub type HostSource = WindowsSource;

#[cfg(target_os = "linux")]
pub use linux::LinuxSource;

/// Process source for the host OS
#[cfg(target_os = "linux")]
pub type HostSource = LinuxSource;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub use noop::NoopSource;

/// Process source for the host OS
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub type HostSource = NoopSource;

use crate::config::{MemoryMetric, WatchSet};

/// Return every running process whose executable name is in `watch`.
///
/// A snapshot that cannot be taken is treated as "nothing running" for this
/// call.
pub fn resolve<S: ProcessSource + ?Sized>(source: &S, watch: &WatchSet) -> Vec<ProcessEntry> {
    match source.snapshot() {
        Ok(processes) => processes
            .into_iter()
            .filter(|p| watch.contains(&p.name))
            .collect(),
        Err(e) => {
            tracing::debug!("{e}; treating as no processes this tick");
            Vec::new()
        }
    }
}

/// Sample one process, returning the chosen counter in KB.
///
/// `None` means the process could not be opened or queried.
pub fn sample<S: ProcessSource + ?Sized>(source: &S, pid: u32, metric: MemoryMetric) -> Option<u64> {
    match source.memory(pid) {
        Ok(counters) => {
            let bytes = match metric {
                MemoryMetric::Private => counters.private_bytes,
                MemoryMetric::WorkingSet => counters.working_set_bytes,
            };
            Some(bytes / 1024)
        }
        Err(e) => {
            tracing::trace!("{e}");
            None
        }
    }
}
