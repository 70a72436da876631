//! procmem-sampler - windowed memory time series for named processes.
//!
//! The sampler watches a fixed set of executable names, records the memory
//! usage of every matching process at a fixed cadence, groups the samples
//! into fixed-duration windows, and writes one CSV file per window and
//! application when the run is interrupted.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Sampler (tick)                        │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐          │
//! │  │  Collector  │──▶│  Windowing  │──▶│ Aggregator  │          │
//! │  │ resolve +   │   │ (30s bins)  │   │ (all windows│          │
//! │  │ sample      │   └─────────────┘   │  in memory) │          │
//! │  └─────────────┘                     └─────────────┘          │
//! │         │                                   │ on Ctrl+C       │
//! │         ▼                                   ▼                 │
//! │  ┌─────────────┐                     ┌─────────────┐          │
//! │  │   Session   │                     │ CSV export  │          │
//! │  │    stats    │                     │ per app     │          │
//! │  └─────────────┘                     └─────────────┘          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use procmem_sampler::{collector::HostSource, Config, Sampler, WatchSet};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config {
//!     watch: WatchSet::from_csv("notepad.exe"),
//!     ..Config::default()
//! };
//! let mut sampler = Sampler::new(HostSource::new(), &config, chrono::Local::now());
//!
//! let running = AtomicBool::new(true);
//! sampler.run(&running);
//! let (report, _stats) = sampler.finish();
//! assert!(report.is_clean());
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod export;
pub mod scheduler;
pub mod stats;

// Re-export key types at crate root for convenience
pub use collector::{CollectorError, HostSource, MemoryCounters, ProcessEntry, ProcessSource};
pub use config::{Config, ConfigError, MemoryMetric, WatchSet};
pub use core::{Aggregator, Sample, Window, WindowManager};
pub use export::{ExportError, ExportFailure, FlushReport, CSV_HEADER};
pub use scheduler::{Sampler, TickOutcome};
pub use stats::SessionStats;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
