//! Scan configuration, built once by the binary and read-only afterwards.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::scanner::ProbeSettings;

/// Worker count used when none is given.
pub const DEFAULT_WORKERS: usize = 50;

/// Where the result log lives, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "out/scan-results.log";

/// Configuration problems. All of them stop the run before any worker starts.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target must not be empty")]
    EmptyTarget,

    #[error("invalid port range {start}-{end} (end port is below start port)")]
    InvertedRange { start: u16, end: u16 },

    #[error("could not resolve target {target}: {reason}")]
    Unresolvable { target: String, reason: String },
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: String,
    pub start_port: u16,
    pub end_port: u16,
    pub workers: usize,
    pub log_path: PathBuf,
    pub probe: ProbeSettings,
}

impl ScanConfig {
    /// Validate and normalize raw inputs.
    ///
    /// `start_port` and `workers` are clamped to at least 1; a missing
    /// worker count means [`DEFAULT_WORKERS`].
    pub fn new(
        target: impl Into<String>,
        start_port: u16,
        end_port: u16,
        workers: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let target = target.into().trim().to_string();
        if target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        let start_port = start_port.max(1);
        if end_port < start_port {
            return Err(ConfigError::InvertedRange {
                start: start_port,
                end: end_port,
            });
        }
        Ok(Self {
            target,
            start_port,
            end_port,
            workers: workers.unwrap_or(DEFAULT_WORKERS).max(1),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            probe: ProbeSettings::default(),
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.probe = self.probe.with_connect_timeout(timeout);
        self
    }

    pub fn port_count(&self) -> usize {
        usize::from(self.end_port) - usize::from(self.start_port) + 1
    }

    /// Scan-start marker written to the result log.
    pub fn start_marker(&self) -> String {
        format!(
            "=== New scan: target={} ports={}-{} threads={}",
            self.target, self.start_port, self.end_port, self.workers
        )
    }

    /// Scan-finished marker written to the result log.
    pub fn finish_marker(&self) -> String {
        format!("=== Scan finished for {}", self.target)
    }
}

/// Resolve the target once. Every address is kept, in resolver order, so a
/// dual-stack name can still be reached over whichever family is listening.
pub async fn resolve_target(target: &str) -> Result<Vec<IpAddr>, ConfigError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }
    let unresolvable = |reason: String| ConfigError::Unresolvable {
        target: target.to_string(),
        reason,
    };
    let mut addrs: Vec<IpAddr> = Vec::new();
    for sa in tokio::net::lookup_host((target, 0))
        .await
        .map_err(|e| unresolvable(e.to_string()))?
    {
        if !addrs.contains(&sa.ip()) {
            addrs.push(sa.ip());
        }
    }
    if addrs.is_empty() {
        return Err(unresolvable("no addresses returned".into()));
    }
    Ok(addrs)
}
