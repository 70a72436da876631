use chrono::{DateTime, Duration, Local, TimeZone};
use procmem_sampler::{
    CollectorError, Config, MemoryCounters, ProcessEntry, ProcessSource, Sampler, WatchSet,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

/// Fake host: a mutable table of pid -> (name, private KB).
#[derive(Default)]
struct FakeHost {
    table: RefCell<HashMap<u32, (String, u64)>>,
}

impl FakeHost {
    fn set(&self, pid: u32, name: &str, kb: u64) {
        self.table.borrow_mut().insert(pid, (name.to_string(), kb));
    }

    fn kill(&self, pid: u32) {
        self.table.borrow_mut().remove(&pid);
    }
}

impl ProcessSource for FakeHost {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>, CollectorError> {
        let mut entries: Vec<ProcessEntry> = self
            .table
            .borrow()
            .iter()
            .map(|(pid, (name, _))| ProcessEntry::new(*pid, name.clone()))
            .collect();
        entries.sort_by_key(|e| e.pid);
        Ok(entries)
    }

    fn memory(&self, pid: u32) -> Result<MemoryCounters, CollectorError> {
        self.table
            .borrow()
            .get(&pid)
            .map(|(_, kb)| MemoryCounters {
                private_bytes: kb * 1024,
                working_set_bytes: kb * 1024,
            })
            .ok_or(CollectorError::ProcessUnavailable(pid))
    }
}

fn start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap()
}

fn sampler_for(watch: &str, root: &Path) -> Sampler<FakeHost> {
    let config = Config {
        watch: WatchSet::from_csv(watch),
        output_root: root.to_path_buf(),
        ..Config::default()
    };
    Sampler::new(FakeHost::default(), &config, start())
}

fn data_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        vec!["Day", "Time", "Process", "Memory Usage (KB)"]
    );
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_interrupted_run_writes_one_file_per_window() {
    let dir = TempDir::new().unwrap();
    let mut sampler = sampler_for("A.exe", dir.path());

    sampler.source().set(100, "A.exe", 1000);
    sampler.tick(start());

    sampler.source().set(100, "A.exe", 1100);
    sampler.tick(start() + Duration::seconds(32));

    // Interrupt at t=40: no further ticks, just the flush
    let (report, stats) = sampler.finish();
    assert!(report.is_clean());
    assert_eq!(stats.ticks, 2);

    let w0 = dir.path().join("2024-03-05_09-30-00").join("A.exe.csv");
    let w1 = dir.path().join("2024-03-05_09-30-32").join("A.exe.csv");
    assert_eq!(data_rows(&w0), vec![vec!["2024-03-05", "09:30:00", "A.exe", "1000"]]);
    assert_eq!(data_rows(&w1), vec![vec!["2024-03-05", "09:30:32", "A.exe", "1100"]]);
}

#[test]
fn test_process_restart_is_followed_by_name() {
    let dir = TempDir::new().unwrap();
    let mut sampler = sampler_for("A.exe", dir.path());

    sampler.source().set(100, "A.exe", 1000);
    sampler.tick(start());

    sampler.source().kill(100);
    sampler.tick(start() + Duration::seconds(4));

    sampler.source().set(200, "A.exe", 900);
    sampler.tick(start() + Duration::seconds(8));

    let (report, _) = sampler.finish();
    assert_eq!(report.written.len(), 1);

    let rows = data_rows(&report.written[0]);
    let usage: Vec<&str> = rows.iter().map(|r| r[3].as_str()).collect();
    assert_eq!(usage, vec!["1000", "900"]);
}

#[test]
fn test_windows_are_written_even_when_nothing_ran() {
    let dir = TempDir::new().unwrap();
    let mut sampler = sampler_for("A.exe,B.exe", dir.path());

    for step in 0..20 {
        sampler.tick(start() + Duration::seconds(step * 4));
    }
    let windows = sampler.windows().len();

    let (report, stats) = sampler.finish();
    assert_eq!(stats.windows_opened as usize, windows);
    assert_eq!(report.written.len(), windows * 2);
    for path in &report.written {
        assert!(data_rows(path).is_empty());
    }
}

#[test]
fn test_rerun_overwrites_previous_files() {
    let dir = TempDir::new().unwrap();

    let mut first = sampler_for("A.exe", dir.path());
    first.source().set(1, "A.exe", 10);
    first.tick(start());
    first.tick(start() + Duration::seconds(4));
    first.finish();

    let mut second = sampler_for("A.exe", dir.path());
    second.source().set(1, "A.exe", 20);
    second.tick(start());
    let (report, _) = second.finish();

    let rows = data_rows(&report.written[0]);
    assert_eq!(rows, vec![vec!["2024-03-05", "09:30:00", "A.exe", "20"]]);
}
