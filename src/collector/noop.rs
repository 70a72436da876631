//! Fallback process source for targets without a native implementation.
//!
//! This exists so the crate (and binary) can compile everywhere. It never
//! sees any process, so every window ends up with header-only files.

use crate::collector::types::{CollectorError, MemoryCounters, ProcessEntry, ProcessSource};

/// A source that reports an empty process list.
#[derive(Debug, Default)]
pub struct NoopSource;

impl NoopSource {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSource for NoopSource {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError> {
        Ok(Vec::new())
    }

    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError> {
        Err(CollectorError::ProcessUnavailable(pid))
    }
}
