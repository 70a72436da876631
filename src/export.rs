//! CSV persistence of collected windows.
//!
//! Every (window, application) bucket becomes `<window folder>/<app>.csv`.
//! Writing is best-effort per file: a failure is recorded in the
//! [`FlushReport`] and the remaining files are still written.

use crate::core::{Sample, Window};
use std::path::{Path, PathBuf};

/// Header row of every output file.
pub const CSV_HEADER: [&str; 4] = ["Day", "Time", "Process", "Memory Usage (KB)"];

/// Errors raised while writing one file.
#[derive(Debug)]
pub enum ExportError {
    CreateDir(String),
    Write(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::CreateDir(e) => write!(f, "could not create folder: {e}"),
            ExportError::Write(e) => write!(f, "could not write file: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Write(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Write(e.to_string())
    }
}

/// A file that could not be written.
#[derive(Debug)]
pub struct ExportFailure {
    /// Application whose series was lost
    pub app: String,
    pub path: PathBuf,
    pub error: ExportError,
}

/// Outcome of a flush.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl FlushReport {
    /// True when every file was written.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Output path for `app` within `window`.
pub fn csv_path(window: &Window, app: &str) -> PathBuf {
    window.folder.join(format!("{app}.csv"))
}

/// Write one series, replacing any existing file at `path`.
pub fn write_series(path: &Path, app: &str, samples: &[Sample]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for sample in samples {
        writer.write_record([
            sample.day.as_str(),
            sample.time.as_str(),
            app,
            sample.usage_kb.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every bucket of every window, including empty ones.
pub fn flush(windows: &[Window]) -> FlushReport {
    let mut report = FlushReport::default();

    for window in windows {
        let folder_ready = std::fs::create_dir_all(&window.folder).map_err(|e| e.to_string());

        for (app, samples) in window.buckets() {
            let path = csv_path(window, app);
            let result = match &folder_ready {
                Ok(()) => write_series(&path, app, samples),
                Err(e) => Err(ExportError::CreateDir(e.clone())),
            };

            match result {
                Ok(()) => {
                    tracing::debug!(rows = samples.len(), "wrote {}", path.display());
                    report.written.push(path);
                }
                Err(error) => report.failures.push(ExportFailure {
                    app: app.to_string(),
                    path,
                    error,
                }),
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchSet;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("A.exe.csv");
        let samples = vec![
            Sample {
                day: "2024-01-01".to_string(),
                time: "10:00:00".to_string(),
                usage_kb: 1024,
            },
            Sample {
                day: "2024-01-01".to_string(),
                time: "10:00:04".to_string(),
                usage_kb: 1088,
            },
        ];

        write_series(&path, "A.exe", &samples).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Day,Time,Process,Memory Usage (KB)\n"));
        assert!(content.ends_with('\n'));

        let rows = read_rows(&path);
        assert_eq!(
            rows,
            vec![
                vec!["2024-01-01", "10:00:00", "A.exe", "1024"],
                vec!["2024-01-01", "10:00:04", "A.exe", "1088"],
            ]
        );
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("A.exe.csv");
        std::fs::write(&path, "stale\nstale\nstale\n").unwrap();

        write_series(&path, "A.exe", &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Day,Time,Process,Memory Usage (KB)\n");
    }

    #[test]
    fn test_flush_writes_empty_buckets() {
        let dir = tempdir().unwrap();
        let t0 = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut window = Window::new(t0, &WatchSet::from_csv("A.exe,B.exe"), dir.path());
        window.push("A.exe", Sample::at(t0, 1000));

        let report = flush(&[window]);
        assert!(report.is_clean());
        assert_eq!(report.written.len(), 2);

        let folder = dir.path().join("2024-01-01_10-00-00");
        assert_eq!(read_rows(&folder.join("A.exe.csv")).len(), 1);
        assert!(read_rows(&folder.join("B.exe.csv")).is_empty());
    }

    #[test]
    fn test_flush_continues_after_failure() {
        let dir = tempdir().unwrap();
        let t0 = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let watch = WatchSet::from_csv("A.exe,B.exe");
        let window = Window::new(t0, &watch, dir.path());

        // A directory where A.exe.csv should go makes that one file unwritable
        std::fs::create_dir_all(window.folder.join("A.exe.csv")).unwrap();

        let report = flush(&[window]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].app, "A.exe");
        assert_eq!(report.written.len(), 1);
        assert!(report.written[0].ends_with("B.exe.csv"));
    }

    #[test]
    fn test_flush_reports_unusable_folder() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let t0 = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let window = Window::new(t0, &WatchSet::from_csv("A.exe"), &blocker);

        let report = flush(&[window]);
        assert!(report.written.is_empty());
        assert!(matches!(report.failures[0].error, ExportError::CreateDir(_)));
    }
}
