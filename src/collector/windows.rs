//! Windows process source built on ToolHelp32 and PSAPI.
//!
//! Processes are enumerated with `CreateToolhelp32Snapshot` and
//! `Process32FirstW`/`Process32NextW`; memory comes from
//! `GetProcessMemoryInfo` with the extended counters so the private usage
//! field is available. Every handle is owned by a guard that closes it on
//! drop, so early returns cannot leak.

use crate::collector::types::{CollectorError, MemoryCounters, ProcessEntry, ProcessSource};
use std::mem;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::{
    GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS, PROCESS_MEMORY_COUNTERS_EX,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

/// Owned Win32 handle, closed when dropped.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    /// Snapshot of every process on the system.
    fn process_snapshot() -> windows::core::Result<Self> {
        // SAFETY: the process id argument is ignored for TH32CS_SNAPPROCESS.
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)? };
        Ok(Self(handle))
    }

    /// Query-only handle to one process.
    fn open_query(pid: u32) -> windows::core::Result<Self> {
        // SAFETY: OpenProcess reports failure through the Result; no pointers are passed.
        let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid)? };
        Ok(Self(handle))
    }

    fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: we own this handle and close it exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Converts a null-terminated wide string to a Rust String
fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

/// Process source backed by the Win32 API.
#[derive(Debug, Default)]
pub struct WindowsSource;

impl WindowsSource {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSource for WindowsSource {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError> {
        let snapshot = OwnedHandle::process_snapshot()
            .map_err(|e| CollectorError::SnapshotFailed(e.to_string()))?;

        // dwSize must be set before the first call
        let mut entry = PROCESSENTRY32W {
            dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        let mut processes = Vec::new();

        // SAFETY: valid snapshot handle and an initialized entry.
        let mut step = unsafe { Process32FirstW(snapshot.as_raw(), &mut entry) };
        while step.is_ok() {
            processes.push(ProcessEntry::new(
                entry.th32ProcessID,
                wide_to_string(&entry.szExeFile),
            ));
            // SAFETY: same handle and entry as above.
            step = unsafe { Process32NextW(snapshot.as_raw(), &mut entry) };
        }

        Ok(processes)
    }

    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError> {
        let process =
            OwnedHandle::open_query(pid).map_err(|_| CollectorError::ProcessUnavailable(pid))?;

        let size = mem::size_of::<PROCESS_MEMORY_COUNTERS_EX>() as u32;
        let mut counters = PROCESS_MEMORY_COUNTERS_EX {
            cb: size,
            ..Default::default()
        };

        // SAFETY: the EX struct starts with PROCESS_MEMORY_COUNTERS and cb
        // tells the API how much of it may be written.
        unsafe {
            GetProcessMemoryInfo(
                process.as_raw(),
                &mut counters as *mut PROCESS_MEMORY_COUNTERS_EX as *mut PROCESS_MEMORY_COUNTERS,
                size,
            )
        }
        .map_err(|e| CollectorError::QueryFailed {
            pid,
            reason: e.to_string(),
        })?;

        Ok(MemoryCounters {
            private_bytes: counters.PrivateUsage as u64,
            working_set_bytes: counters.WorkingSetSize as u64,
        })
    }
}
