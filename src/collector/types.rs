//! Types shared by the platform process sources.

/// A running process as seen in one enumeration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Executable name, e.g. "notepad.exe"
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Memory counters returned by a single query, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCounters {
    /// Committed memory not shared with other processes
    pub private_bytes: u64,
    /// Resident working set
    pub working_set_bytes: u64,
}

/// Errors raised by a process source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    /// The process list could not be captured
    SnapshotFailed(String),
    /// The process exited or refused a query handle
    ProcessUnavailable(u32),
    /// The memory query itself failed
    QueryFailed { pid: u32, reason: String },
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::SnapshotFailed(e) => write!(f, "Process snapshot failed: {e}"),
            CollectorError::ProcessUnavailable(pid) => {
                write!(f, "Process {pid} exited or denied access")
            }
            CollectorError::QueryFailed { pid, reason } => {
                write!(f, "Memory query for process {pid} failed: {reason}")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

/// Host collaborator that can list processes and query their memory.
pub trait ProcessSource {
    /// Capture every running process. Resources acquired for the snapshot
    /// are released before returning.
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError>;

    /// Query the memory counters of one process.
    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError>;
}
