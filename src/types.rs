use std::fmt;

use ::time::{format_description::well_known, OffsetDateTime};

/// Banner text recorded when an open port sent nothing usable.
pub const NO_BANNER: &str = "<no-banner>";

/// Result of probing one target:port.
///
/// Not retained by the engine: the worker that produced it forwards the
/// report line to the sink and drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub target: String,
    pub port: u16,
    pub open: bool,
    pub banner: Option<String>,
    pub latency_ms: u64,
    pub timestamp: String,
}

impl ScanOutcome {
    pub fn open(target: impl Into<String>, port: u16, banner: String, latency_ms: u64) -> Self {
        Self {
            target: target.into(),
            port,
            open: true,
            banner: Some(banner),
            latency_ms,
            timestamp: now_rfc3339(),
        }
    }

    /// Closed, filtered, or unreachable.
    pub fn closed(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
            open: false,
            banner: None,
            latency_ms: 0,
            timestamp: now_rfc3339(),
        }
    }

    /// The sink line for an open port, `None` for anything else.
    pub fn report_line(&self) -> Option<String> {
        self.open.then(|| self.to_string())
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.open { "OPEN" } else { "CLOSED" };
        write!(
            f,
            "{state} - {}:{} - banner: {}",
            self.target,
            self.port,
            self.banner.as_deref().unwrap_or(NO_BANNER)
        )
    }
}

/// RFC3339 UTC timestamp, used for both outcomes and sink lines.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
