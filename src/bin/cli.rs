//! stockwatch CLI
//!
//! One-shot checks, the foreground monitor loop, and the process
//! lifecycle helpers (background start/stop) around the shared status and
//! log files.

use std::fs;
use std::path::PathBuf;
use std::process::{Command as Process, Stdio};

use clap::{Parser, Subcommand};
use stockwatch::{
    error::Result,
    models::Config,
    pipeline,
    services::{Detector, SmtpNotifier},
    storage::StatusStore,
    utils::log as console,
};

/// stockwatch - product page availability monitor
#[derive(Parser, Debug)]
#[command(
    name = "stockwatch",
    version,
    about = "Watches a product page for color variant availability"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single check and exit
    Check,

    /// Run the monitor loop in the foreground
    Monitor,

    /// Start the monitor in the background, logging to the log file
    Start,

    /// Stop a background monitor and delete the status, log and pid files
    Stop,

    /// Show whether the monitor is running and the last persisted status
    Status,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    console::init(level);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return Err(e);
        }
    };
    config.validate()?;

    match cli.command {
        Command::Check => {
            let detector = Detector::new(&config.monitor, config.detector.clone())?;
            let notifier = SmtpNotifier::new(config.email.clone());
            let mut store = StatusStore::load(&config.monitor.status_file).await?;

            pipeline::run_check(config.item(), &detector, &mut store, &notifier).await?;
        }

        Command::Monitor => {
            let detector = Detector::new(&config.monitor, config.detector.clone())?;
            let notifier = SmtpNotifier::new(config.email.clone());
            let mut store = StatusStore::load(&config.monitor.status_file).await?;

            pipeline::run_monitor(&config, &detector, &mut store, &notifier).await?;
        }

        Command::Start => start_background(&cli.config, &config)?,

        Command::Stop => stop_background(&config),

        Command::Status => show_status(&config),

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK ({} item(s))", config.items.len());
        }
    }

    Ok(())
}

/// Spawn the monitor detached with output redirected to the log file.
fn start_background(config_path: &PathBuf, config: &Config) -> Result<()> {
    if let Some(pid) = running_pid(config) {
        log::warn!("Monitor already running (pid {pid})");
        return Ok(());
    }

    let exe = std::env::current_exe()?;
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.monitor.log_file)?;
    let err_file = log_file.try_clone()?;

    let child = Process::new(exe)
        .arg("--config")
        .arg(config_path)
        .arg("monitor")
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(err_file))
        .spawn()?;

    fs::write(&config.monitor.pid_file, child.id().to_string())?;

    log::info!("Monitor started in background (pid {})", child.id());
    log::info!("Log file: {}", config.monitor.log_file);
    Ok(())
}

/// Stop the background monitor and remove its working files.
fn stop_background(config: &Config) {
    match running_pid(config) {
        Some(pid) => {
            let killed = Process::new("kill")
                .arg(pid.to_string())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);
            if killed {
                log::info!("Monitor stopped (pid {pid})");
            } else {
                log::warn!("Failed to signal pid {pid}");
            }
        }
        None => log::info!("Monitor is not running"),
    }

    for path in [
        &config.monitor.status_file,
        &config.monitor.log_file,
        &config.monitor.pid_file,
    ] {
        match fs::remove_file(path) {
            Ok(()) => log::info!("Removed {path}"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {path}: {e}"),
        }
    }
}

/// Show the running state, the persisted records and the log tail.
fn show_status(config: &Config) {
    match running_pid(config) {
        Some(pid) => console::info(&format!("Monitor is running (pid {pid})")),
        None => console::info("Monitor is not running"),
    }

    match fs::read_to_string(&config.monitor.status_file) {
        Ok(content) => {
            match serde_json::from_str::<
                std::collections::HashMap<String, stockwatch::models::StatusRecord>,
            >(&content)
            {
                Ok(records) if records.is_empty() => console::info("Status file is empty"),
                Ok(records) => {
                    for (key, record) in &records {
                        console::info(&format!("Item: {key}"));
                        console::sub_item(&format!("in_stock: {:?}", record.in_stock));
                        console::sub_item(&format!("message: {}", record.message));
                        console::sub_item(&format!("last_checked: {}", record.last_checked));
                    }
                }
                Err(e) => console::warn(&format!("Status file unreadable: {e}")),
            }
        }
        Err(_) => console::info("No status file yet"),
    }

    if let Ok(content) = fs::read_to_string(&config.monitor.log_file) {
        let tail: Vec<&str> = content.lines().rev().take(5).collect();
        if !tail.is_empty() {
            console::info("Last log entries:");
            for line in tail.into_iter().rev() {
                console::sub_item(line);
            }
        }
    }
}

/// Read the pid file and check whether that process is still alive.
fn running_pid(config: &Config) -> Option<u32> {
    let pid: u32 = fs::read_to_string(&config.monitor.pid_file)
        .ok()?
        .trim()
        .parse()
        .ok()?;

    let alive = Process::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);
    alive.then_some(pid)
}
