use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing::{info, warn};

use port_grab::config::{resolve_target, ConfigError, ScanConfig};
use port_grab::logging;
use port_grab::pool::WorkerPool;
use port_grab::ports::PortQueue;
use port_grab::scanner::Scanner;
use port_grab::sink::ResultSink;

/// port-grab: concurrent TCP connect scanner with banner capture for a single host.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-grab",
    version,
    about = "Concurrent TCP connect scanner with banner capture for a single host.",
    long_about = None
)]
struct Cli {
    /// Host name or IP address to scan.
    target: String,

    /// First port of the inclusive range.
    start_port: u16,

    /// Last port of the inclusive range.
    end_port: u16,

    /// Number of concurrent workers [default: 50].
    workers: Option<usize>,

    /// Connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 800)]
    timeout_ms: u64,

    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = match ScanConfig::new(&cli.target, cli.start_port, cli.end_port, cli.workers) {
        Ok(c) => c.with_connect_timeout(Duration::from_millis(cli.timeout_ms)),
        Err(e) => usage_error(e),
    };
    let addrs = resolve_target(&cfg.target)
        .await
        .with_context(|| format!("cannot scan {}", cfg.target))?;
    info!(host = %cfg.target, addrs = ?addrs, ports = cfg.port_count(), workers = cfg.workers, "starting scan");

    ensure_parent_dir(&cfg.log_path);
    let sink = Arc::new(ResultSink::open(&cfg.log_path).await);
    sink.write(&cfg.start_marker()).await;

    let queue = Arc::new(PortQueue::seed(cfg.start_port, cfg.end_port));
    let scanner = Arc::new(Scanner::new(cfg.target.clone(), addrs, cfg.probe.clone()));
    let report = WorkerPool::new(cfg.workers)
        .run(queue, scanner, sink.clone())
        .await;

    sink.write(&cfg.finish_marker()).await;
    info!(scanned = report.scanned, open = report.open, "scan finished");
    if sink.failures() > 0 {
        warn!("{} result log write(s) failed", sink.failures());
    }
    Ok(())
}

/// Report a configuration problem with usage and exit non-zero.
fn usage_error(e: ConfigError) -> ! {
    Cli::command().error(ErrorKind::ValueValidation, e).exit()
}

/// Best-effort creation of the log directory.
fn ensure_parent_dir(path: &Path) {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("could not create {}: {e}", dir.display());
        }
    }
}
