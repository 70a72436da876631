//! Window management for grouping samples into fixed-duration folders.
//!
//! A new window is opened every `window_duration`; each window owns one
//! bucket per watched application and maps to its own output folder.

use crate::config::WatchSet;
use chrono::{DateTime, Duration, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Day column format
pub const DAY_FORMAT: &str = "%Y-%m-%d";
/// Time-of-day column format
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Window folder name format
pub const FOLDER_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// One memory reading of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub day: String,
    pub time: String,
    pub usage_kb: u64,
}

impl Sample {
    /// Create a sample stamped with the given tick time.
    pub fn at(timestamp: DateTime<Local>, usage_kb: u64) -> Self {
        Self {
            day: timestamp.format(DAY_FORMAT).to_string(),
            time: timestamp.format(TIME_FORMAT).to_string(),
            usage_kb,
        }
    }
}

/// A time window holding per-application sample series.
#[derive(Debug, Clone)]
pub struct Window {
    /// When the window was opened
    pub created: DateTime<Local>,
    /// Destination folder for this window's files
    pub folder: PathBuf,
    /// One bucket per watched name, in watch-set order
    buckets: Vec<(String, Vec<Sample>)>,
}

impl Window {
    /// Create an empty window with a bucket for every watched name.
    pub fn new(created: DateTime<Local>, watch: &WatchSet, output_root: &Path) -> Self {
        Self::with_label(created, folder_label(created), watch, output_root)
    }

    fn with_label(
        created: DateTime<Local>,
        label: String,
        watch: &WatchSet,
        output_root: &Path,
    ) -> Self {
        Self {
            created,
            folder: output_root.join(label),
            buckets: watch.iter().map(|name| (name.to_string(), Vec::new())).collect(),
        }
    }

    /// Folder name of this window, e.g. `2024-01-01_10-00-00`.
    pub fn label(&self) -> String {
        self.folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Append a sample to `app`'s bucket. Returns false for unknown names.
    pub fn push(&mut self, app: &str, sample: Sample) -> bool {
        match self.buckets.iter_mut().find(|(name, _)| name == app) {
            Some((_, samples)) => {
                samples.push(sample);
                true
            }
            None => false,
        }
    }

    /// Samples recorded for `app`, if it is watched.
    pub fn bucket(&self, app: &str) -> Option<&[Sample]> {
        self.buckets
            .iter()
            .find(|(name, _)| name == app)
            .map(|(_, samples)| samples.as_slice())
    }

    /// All buckets in watch-set order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[Sample])> {
        self.buckets
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    pub fn app_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    /// Total number of samples across all buckets.
    pub fn sample_count(&self) -> usize {
        self.buckets.iter().map(|(_, samples)| samples.len()).sum()
    }
}

fn folder_label(created: DateTime<Local>) -> String {
    created.format(FOLDER_FORMAT).to_string()
}

/// Decides when the current window expires and opens the next one.
pub struct WindowManager {
    window_duration: Duration,
    watch: WatchSet,
    output_root: PathBuf,
    /// When the current window stops accepting samples
    deadline: Option<DateTime<Local>>,
    /// Folder names handed out so far
    used_labels: HashSet<String>,
}

impl WindowManager {
    pub fn new(window_duration: std::time::Duration, watch: WatchSet, output_root: PathBuf) -> Self {
        Self {
            window_duration: Duration::seconds(window_duration.as_secs() as i64),
            watch,
            output_root,
            deadline: None,
            used_labels: HashSet::new(),
        }
    }

    /// Open a window at `now` and schedule the next rotation.
    ///
    /// Local wall-clock time can repeat (DST fall-back), so a folder name
    /// already used in this run gets a `_2`, `_3`, ... suffix.
    pub fn open(&mut self, now: DateTime<Local>) -> Window {
        self.deadline = Some(now + self.window_duration);

        let base = folder_label(now);
        let mut label = base.clone();
        let mut n = 2;
        while self.used_labels.contains(&label) {
            label = format!("{base}_{n}");
            n += 1;
        }
        self.used_labels.insert(label.clone());

        Window::with_label(now, label, &self.watch, &self.output_root)
    }

    /// Return a fresh window if the current one has expired at `now`.
    ///
    /// Before the first window is opened this always opens one.
    pub fn maybe_rotate(&mut self, now: DateTime<Local>) -> Option<Window> {
        match self.deadline {
            Some(deadline) if now < deadline => None,
            _ => Some(self.open(now)),
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.deadline
    }

    pub fn watch(&self) -> &WatchSet {
        &self.watch
    }
}
