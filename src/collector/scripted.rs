//! In-memory process source driven by tests.

use super::types::{CollectorError, MemoryCounters, ProcessEntry, ProcessSource};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
pub struct ScriptedSource {
    processes: RefCell<BTreeMap<u32, (String, MemoryCounters)>>,
    failing_queries: RefCell<HashSet<u32>>,
    fail_snapshot: Cell<bool>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or update) a process using `private_kb` of private memory.
    /// The working set is reported as half of it.
    pub fn run(&self, pid: u32, name: &str, private_kb: u64) {
        let counters = MemoryCounters {
            private_bytes: private_kb * 1024,
            working_set_bytes: private_kb * 512,
        };
        self.processes
            .borrow_mut()
            .insert(pid, (name.to_string(), counters));
    }

    pub fn stop(&self, pid: u32) {
        self.processes.borrow_mut().remove(&pid);
    }

    /// Keep `pid` in snapshots but fail its memory queries, as when it exits
    /// between resolution and sampling.
    pub fn fail_queries(&self, pid: u32) {
        self.failing_queries.borrow_mut().insert(pid);
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.fail_snapshot.set(fail);
    }
}

impl ProcessSource for ScriptedSource {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError> {
        if self.fail_snapshot.get() {
            return Err(CollectorError::SnapshotFailed("scripted".to_string()));
        }
        Ok(self
            .processes
            .borrow()
            .iter()
            .map(|(pid, (name, _))| ProcessEntry::new(*pid, name.clone()))
            .collect())
    }

    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError> {
        if self.failing_queries.borrow().contains(&pid) {
            return Err(CollectorError::ProcessUnavailable(pid));
        }
        self.processes
            .borrow()
            .get(&pid)
            .map(|(_, counters)| *counters)
            .ok_or(CollectorError::ProcessUnavailable(pid))
    }
}
