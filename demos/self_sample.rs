//! Sample this demo's own process for a few seconds.
//!
//! This example shows how to:
//! 1. Build a configuration in code
//! 2. Drive the sampler tick by tick
//! 3. Flush the collected windows to CSV
//!
//! Run with: cargo run --example self_sample

use chrono::Local;
use procmem_sampler::{collector, Config, HostSource, ProcessSource, Sampler, WatchSet};
use std::thread;
use std::time::Duration;

fn main() {
    println!("procmem - self sampling demo");
    println!("============================");
    println!();

    // Find our own executable name the way the sampler will see it
    let source = HostSource::new();
    let pid = std::process::id();
    let name = match source.snapshot() {
        Ok(processes) => processes.into_iter().find(|p| p.pid == pid).map(|p| p.name),
        Err(e) => {
            eprintln!("Snapshot failed: {e}");
            return;
        }
    };
    let Some(name) = name else {
        println!("This platform cannot see its own process; nothing to sample.");
        return;
    };

    let output_root = std::env::temp_dir().join("procmem-demo");
    let config = Config {
        watch: WatchSet::new([name.clone()]),
        window_duration: Duration::from_secs(3),
        tick_interval: Duration::from_secs(1),
        output_root,
        ..Config::default()
    };

    println!("Watching {name} (pid {pid})");
    println!("  Window duration: {}s", config.window_duration.as_secs());
    println!();

    let mut sampler = Sampler::new(source, &config, Local::now());
    if let Some(window) = sampler.windows().last() {
        println!("First window: {}", window.folder.display());
    }
    let mut ballast: Vec<Vec<u8>> = Vec::new();

    for _ in 0..7 {
        let outcome = sampler.tick(Local::now());
        if let Some(folder) = &outcome.opened {
            println!("New window: {}", folder.display());
        }
        let usage = collector::sample(sampler.source(), pid, config.metric);
        println!(
            "  recorded={} usage={} KB",
            outcome.recorded,
            usage.unwrap_or(0)
        );

        // Grow a little so the series is not flat
        ballast.push(vec![1u8; 4 * 1024 * 1024]);
        thread::sleep(config.tick_interval);
    }

    let (report, stats) = sampler.finish();
    println!();
    for path in &report.written {
        println!("Wrote {}", path.display());
    }
    for failure in &report.failures {
        eprintln!("Failed {}: {}", failure.path.display(), failure.error);
    }
    println!();
    println!("{}", stats.summary(Local::now()));
    drop(ballast);
}
