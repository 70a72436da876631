//! procmem CLI
//!
//! Samples the memory usage of named processes into windowed CSV files.

use chrono::Local;
use clap::{Parser, Subcommand};
use procmem_sampler::{
    collector::{self, HostSource},
    Config, MemoryMetric, Sampler, WatchSet, VERSION,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procmem")]
#[command(version = VERSION)]
#[command(about = "Record memory usage of named processes into windowed CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sampling until interrupted with Ctrl+C
    Start {
        /// Executable names to watch, comma separated (e.g. "chrome.exe,code.exe")
        #[arg(long, short)]
        watch: String,

        /// Window duration in seconds; each window gets its own folder
        #[arg(long, default_value = "30")]
        window: u64,

        /// Seconds between samples
        #[arg(long, default_value = "4")]
        interval: u64,

        /// Directory that receives the window folders
        #[arg(long, short, default_value = ".")]
        output: PathBuf,

        /// Memory counter to record
        #[arg(long, value_enum, default_value_t = MemoryMetric::Private)]
        metric: MemoryMetric,
    },

    /// Sample the watched processes once and print the result
    Check {
        /// Executable names to watch, comma separated
        #[arg(long, short)]
        watch: String,

        /// Memory counter to report
        #[arg(long, value_enum, default_value_t = MemoryMetric::Private)]
        metric: MemoryMetric,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            watch,
            window,
            interval,
            output,
            metric,
        } => {
            let config = Config {
                watch: WatchSet::from_csv(&watch),
                window_duration: Duration::from_secs(window),
                tick_interval: Duration::from_secs(interval),
                output_root: output,
                metric,
            };
            cmd_start(config);
        }
        Commands::Check {
            watch,
            metric,
            json,
        } => {
            cmd_check(&check_config(&watch, metric), json);
        }
    }
}

/// Diagnostics go to stderr, filtered by RUST_LOG (default: warn).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn cmd_start(config: Config) {
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Error: Could not create {}: {e}", config.output_root.display());
        std::process::exit(1);
    }

    println!("procmem v{VERSION} on {}", host_name());
    println!();
    println!("Starting collection...");
    println!(
        "  Watching: {}",
        config.watch.iter().collect::<Vec<_>>().join(", ")
    );
    println!("  Window duration: {}s", config.window_duration.as_secs());
    println!("  Sample interval: {}s", config.tick_interval.as_secs());
    println!("  Output root: {}", config.output_root.display());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    if let Err(e) = ctrlc_handler(running.clone()) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    let mut sampler = Sampler::new(HostSource::new(), &config, Local::now());
    sampler.run(&running);

    println!();
    println!("Stopping collection...");

    let (report, stats) = sampler.finish();
    for failure in &report.failures {
        eprintln!(
            "Error writing {} to {}: {}",
            failure.app,
            failure.path.display(),
            failure.error
        );
    }

    println!();
    println!("{}", stats.summary(Local::now()));
    println!();
    println!("Monitoring stopped by user.");

    if !report.is_clean() {
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct CheckRow {
    pid: u32,
    name: String,
    usage_kb: Option<u64>,
}

#[derive(Serialize)]
struct CheckReport {
    host: String,
    metric: MemoryMetric,
    processes: Vec<CheckRow>,
}

/// One-shot checks share the sampling defaults; only the watch set and metric apply.
fn check_config(watch: &str, metric: MemoryMetric) -> Config {
    Config {
        watch: WatchSet::from_csv(watch),
        metric,
        ..Config::default()
    }
}

fn cmd_check(config: &Config, json: bool) {
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let metric = config.metric;
    let source = HostSource::new();
    let processes: Vec<CheckRow> = collector::resolve(&source, &config.watch)
        .into_iter()
        .map(|entry| CheckRow {
            usage_kb: collector::sample(&source, entry.pid, metric),
            pid: entry.pid,
            name: entry.name,
        })
        .collect();

    let report = CheckReport {
        host: host_name(),
        metric,
        processes,
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if report.processes.is_empty() {
        println!("No watched processes are running on {}.", report.host);
        return;
    }

    println!("{:>8}  {:<32}  {:>12}", "PID", "NAME", "MEMORY (KB)");
    for row in &report.processes {
        let usage = row
            .usage_kb
            .map(|kb| kb.to_string())
            .unwrap_or_else(|| "unavailable".to_string());
        println!("{:>8}  {:<32}  {:>12}", row.pid, row.name, usage);
    }
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
}
