//! Core aggregation for the memory sampler.
//!
//! This module contains:
//! - Window management for grouping samples into timed folders
//! - The aggregator that owns every window until the final flush

pub mod aggregator;
pub mod windowing;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use windowing::{Sample, Window, WindowManager, DAY_FORMAT, FOLDER_FORMAT, TIME_FORMAT};
