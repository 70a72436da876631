//! Linux process source reading `/proc` through the procfs crate.
//!
//! The executable name is the basename of `/proc/<pid>/exe`, which needs the
//! same privileges as the process; when that link cannot be read the
//! (15 character) `comm` field is used instead. A binary replaced or removed
//! while running shows up as `<path> (deleted)`; the marker is dropped so the
//! process keeps its name.
//!
//! Private usage is `VmData + VmStk`, the private writable mappings the
//! kernel has committed for the process. The working set is `VmRSS`.

use crate::collector::types::{CollectorError, MemoryCounters, ProcessEntry, ProcessSource};
use procfs::process::Process;
use procfs::ProcError;
use std::path::Path;

const DELETED_MARKER: &str = " (deleted)";

/// Process source backed by `/proc`.
#[derive(Debug, Default)]
pub struct LinuxSource;

impl LinuxSource {
    pub fn new() -> Self {
        Self
    }
}

/// Basename of an `exe` link target, without the kernel's deleted marker.
fn exe_basename(target: &Path) -> Option<String> {
    let lossy = target.file_name()?.to_string_lossy();
    let name = lossy.strip_suffix(DELETED_MARKER).unwrap_or(lossy.as_ref());
    (!name.is_empty()).then(|| name.to_string())
}

fn executable_name(process: &Process) -> Option<String> {
    if let Some(name) = process.exe().ok().and_then(|path| exe_basename(&path)) {
        return Some(name);
    }
    process.stat().ok().map(|stat| stat.comm)
}

impl ProcessSource for LinuxSource {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError> {
        let all = procfs::process::all_processes()
            .map_err(|e| CollectorError::SnapshotFailed(e.to_string()))?;

        let mut processes = Vec::new();
        // Entries vanish between listing and reading; skip them
        for process in all.flatten() {
            if let Some(name) = executable_name(&process) {
                processes.push(ProcessEntry::new(process.pid as u32, name));
            }
        }
        Ok(processes)
    }

    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError> {
        let process =
            Process::new(pid as i32).map_err(|_| CollectorError::ProcessUnavailable(pid))?;

        let status = process.status().map_err(|e| match e {
            ProcError::NotFound(_) | ProcError::PermissionDenied(_) => {
                CollectorError::ProcessUnavailable(pid)
            }
            other => CollectorError::QueryFailed {
                pid,
                reason: other.to_string(),
            },
        })?;

        // Kernel threads have no Vm* lines at all
        let (Some(data_kb), Some(rss_kb)) = (status.vmdata, status.vmrss) else {
            return Err(CollectorError::QueryFailed {
                pid,
                reason: "no memory counters in status".to_string(),
            });
        };
        let stack_kb = status.vmstk.unwrap_or(0);

        Ok(MemoryCounters {
            private_bytes: (data_kb + stack_kb) * 1024,
            working_set_bytes: rss_kb * 1024,
        })
    }
}
