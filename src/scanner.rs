use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::types::{ScanOutcome, NO_BANNER};

/// Ports that get a minimal HTTP request when they stay silent.
pub const DEFAULT_HTTP_PORTS: &[u16] = &[80, 8080, 8000];

/// Timing and buffer knobs for a single probe.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Upper bound on the TCP handshake.
    pub connect_timeout: Duration,
    /// Pause after connecting so the server can push a banner.
    pub grace: Duration,
    /// Pause between sending the HTTP request and reading the reply.
    pub http_sleep: Duration,
    /// Deadline on each read. Kept within the grace window so a silent
    /// port costs about `grace + read_timeout` after connecting.
    pub read_timeout: Duration,
    /// First read size; the HTTP read uses twice this.
    pub read_buf: usize,
    pub http_ports: Vec<u16>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(800),
            grace: Duration::from_millis(10),
            http_sleep: Duration::from_millis(20),
            read_timeout: Duration::from_millis(10),
            read_buf: 1024,
            http_ports: DEFAULT_HTTP_PORTS.to_vec(),
        }
    }
}

impl ProbeSettings {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_http_ports(mut self, ports: impl Into<Vec<u16>>) -> Self {
        self.http_ports = ports.into();
        self
    }

    fn is_http_port(&self, port: u16) -> bool {
        self.http_ports.contains(&port)
    }
}

/// Anything the worker pool can run against a port.
pub trait PortProbe: Send + Sync + 'static {
    fn probe(&self, port: u16) -> impl Future<Output = ScanOutcome> + Send;
}

/// TCP connect + banner grab against one host.
#[derive(Debug, Clone)]
pub struct Scanner {
    target: String,
    addrs: Vec<IpAddr>,
    settings: ProbeSettings,
}

impl Scanner {
    /// `target` is the name used in report lines; `addrs` are every address
    /// it resolved to, dialed in order.
    pub fn new(target: impl Into<String>, addrs: impl Into<Vec<IpAddr>>, settings: ProbeSettings) -> Self {
        Self {
            target: target.into(),
            addrs: addrs.into(),
            settings,
        }
    }

    /// Probe a single port.
    ///
    /// - Connect bounded by `connect_timeout`, shared by all addresses of the
    ///   target; the first that accepts wins, none accepting means closed/filtered.
    /// - After `grace`, one bounded read of up to `read_buf` bytes.
    /// - Silent HTTP ports get `GET / HTTP/1.0` and a second read of `2 * read_buf`.
    /// - Read or write errors after connect still report the port open.
    ///
    /// The stream is owned by this call and dropped (closed) on every return.
    pub async fn scan_port(&self, port: u16) -> ScanOutcome {
        let candidates: Vec<SocketAddr> = self.addrs.iter().map(|ip| SocketAddr::new(*ip, port)).collect();
        let start = Instant::now();
        let mut stream = match time::timeout(self.settings.connect_timeout, TcpStream::connect(&candidates[..])).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                trace!("{}:{port}: connect failed: {e}", self.target);
                return ScanOutcome::closed(&self.target, port);
            }
            Err(_) => {
                trace!("{}:{port}: connect timed out", self.target);
                return ScanOutcome::closed(&self.target, port);
            }
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        time::sleep(self.settings.grace).await;
        let mut captured = read_bounded(&mut stream, self.settings.read_buf, self.settings.read_timeout).await;

        if captured.is_empty() && self.settings.is_http_port(port) {
            debug!("{}:{port}: silent, trying HTTP", self.target);
            captured = self.http_fallback(&mut stream).await;
        }

        ScanOutcome::open(&self.target, port, banner_text(&captured), latency_ms)
    }

    async fn http_fallback(&self, stream: &mut TcpStream) -> Vec<u8> {
        let request = format!("GET / HTTP/1.0\r\nHost: {}\r\n\r\n", self.target);
        if let Err(e) = stream.write_all(request.as_bytes()).await {
            debug!("{}: HTTP request write failed: {e}", self.target);
            return Vec::new();
        }
        time::sleep(self.settings.http_sleep).await;
        read_bounded(stream, self.settings.read_buf * 2, self.settings.read_timeout).await
    }
}

impl PortProbe for Scanner {
    fn probe(&self, port: u16) -> impl Future<Output = ScanOutcome> + Send {
        self.scan_port(port)
    }
}

/// One read of at most `cap` bytes under a deadline. Errors, EOF and timeouts
/// all come back as an empty buffer.
async fn read_bounded(stream: &mut TcpStream, cap: usize, deadline: Duration) -> Vec<u8> {
    let mut buf = vec![0u8; cap];
    match time::timeout(deadline, stream.read(&mut buf)).await {
        Ok(Ok(n)) => {
            buf.truncate(n);
            buf
        }
        Ok(Err(e)) => {
            trace!("banner read failed: {e}");
            Vec::new()
        }
        Err(_) => Vec::new(),
    }
}

/// Trimmed, single-line banner text, or the placeholder when nothing useful
/// was captured.
pub fn banner_text(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    let s = s.trim();
    if s.is_empty() {
        return NO_BANNER.to_string();
    }
    s.replace('\r', "\\r").replace('\n', "\\n")
}
