//! Probe method implementations
//!
//! Every method answers the same question: did (host, port) respond within
//! the timeout? A method that structurally cannot run (missing binary,
//! unparsable tool output) reports a failure outcome rather than an error,
//! so the tiered prober can fall through to the next method.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::process::Command;

/// Name of the external high-precision scanning binary
pub const EXTERNAL_PROBE_BIN: &str = "nping";

/// Grace added on top of the probe timeout before a spawned tool is killed
const SPAWN_GRACE: Duration = Duration::from_secs(1);

/// Probe method enumeration, in tier priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeMethodKind {
    External,
    Socket,
    Icmp,
}

impl fmt::Display for ProbeMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMethodKind::External => write!(f, "{}", EXTERNAL_PROBE_BIN),
            ProbeMethodKind::Socket => write!(f, "tcp-connect"),
            ProbeMethodKind::Icmp => write!(f, "icmp-echo"),
        }
    }
}

/// Result of a single reachability probe
///
/// The round-trip time is informational only; callers decide on
/// `succeeded` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub succeeded: bool,
    pub rtt_ms: Option<f64>,
    pub method: ProbeMethodKind,
}

impl ProbeOutcome {
    pub fn success(method: ProbeMethodKind, rtt_ms: Option<f64>) -> Self {
        Self {
            succeeded: true,
            rtt_ms,
            method,
        }
    }

    pub fn failure(method: ProbeMethodKind) -> Self {
        Self {
            succeeded: false,
            rtt_ms: None,
            method,
        }
    }
}

/// A single reachability test method
#[async_trait]
pub trait ProbeMethod: Send + Sync {
    /// Kind tag reported in outcomes and logs
    fn kind(&self) -> ProbeMethodKind;

    /// Whether this method can run on this host at all
    fn available(&self) -> bool {
        true
    }

    /// Attempt one reachability test against (host, port)
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> ProbeOutcome;
}

/// Locate the external scanning binary on `PATH`, once per process.
///
/// Best-effort: absence silently disables [`ExternalProbe`].
pub fn external_probe_path() -> Option<&'static Path> {
    static PATH: Lazy<Option<PathBuf>> = Lazy::new(|| find_in_path(EXTERNAL_PROBE_BIN));
    PATH.as_deref()
}

fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Protocol the external scanner probes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeProtocol {
    #[default]
    Tcp,
    Udp,
    Icmp,
}

impl ProbeProtocol {
    /// Parse a protocol name as given on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tcp" => Some(ProbeProtocol::Tcp),
            "udp" => Some(ProbeProtocol::Udp),
            "icmp" => Some(ProbeProtocol::Icmp),
            _ => None,
        }
    }
}

/// High-precision probe backed by the external scanning binary
///
/// Runs a single-packet test and scrapes the round-trip time out of the
/// textual report. RTT parsing is best-effort: current tool versions emit
/// one of two summary patterns, and a report without a parsable RTT counts
/// as a failed probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalProbe {
    protocol: ProbeProtocol,
}

impl ExternalProbe {
    pub fn new(protocol: ProbeProtocol) -> Self {
        Self { protocol }
    }

    pub fn tcp() -> Self {
        Self::new(ProbeProtocol::Tcp)
    }

    /// Arguments for a single-probe scanner run against (host, port)
    fn tool_args(&self, host: &str, port: u16) -> Vec<String> {
        let mut args = Vec::new();
        match self.protocol {
            ProbeProtocol::Tcp => {
                args.push("--tcp".to_string());
                args.push("-p".to_string());
                args.push(port.to_string());
            }
            ProbeProtocol::Udp => {
                args.push("--udp".to_string());
                args.push("-p".to_string());
                args.push(port.to_string());
            }
            ProbeProtocol::Icmp => {
                args.push("--icmp".to_string());
            }
        }
        args.push("-c".to_string());
        args.push("1".to_string());
        args.push(host.to_string());
        args
    }

    fn command(&self, path: &Path, host: &str, port: u16) -> Command {
        let mut cmd = Command::new(path);
        cmd.args(self.tool_args(host, port))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ProbeMethod for ExternalProbe {
    fn kind(&self) -> ProbeMethodKind {
        ProbeMethodKind::External
    }

    fn available(&self) -> bool {
        external_probe_path().is_some()
    }

    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        let Some(path) = external_probe_path() else {
            return ProbeOutcome::failure(self.kind());
        };

        let mut cmd = self.command(path, host, port);
        let output = match tokio::time::timeout(timeout + SPAWN_GRACE, cmd.output()).await {
            Ok(Ok(output)) => output,
            _ => return ProbeOutcome::failure(self.kind()),
        };

        let report = String::from_utf8_lossy(&output.stdout);
        match parse_scanner_rtt(&report) {
            Some(rtt_ms) => ProbeOutcome::success(self.kind(), Some(rtt_ms)),
            None => ProbeOutcome::failure(self.kind()),
        }
    }
}

/// Scrape a round-trip time (milliseconds) out of the scanner report.
///
/// Matches both summary variants seen across tool versions.
pub(crate) fn parse_scanner_rtt(report: &str) -> Option<f64> {
    static RTT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:Avg rtt|Max rtt):\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("valid rtt regex")
    });
    RTT.captures(report)?.get(1)?.as_str().parse().ok()
}

/// Plain TCP connect probe
///
/// Success means the connection established within the timeout. The socket
/// is closed immediately; no data is sent or received.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketProbe;

#[async_trait]
impl ProbeMethod for SocketProbe {
    fn kind(&self) -> ProbeMethodKind {
        ProbeMethodKind::Socket
    }

    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();
        match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                let rtt_ms = start.elapsed().as_secs_f64() * 1000.0;
                ProbeOutcome::success(self.kind(), Some(rtt_ms))
            }
            // Refused, unresolvable or timed out: all plain failures here.
            _ => ProbeOutcome::failure(self.kind()),
        }
    }
}

/// ICMP echo fallback via the system `ping` utility
///
/// Port-irrelevant last resort. Success requires a parsable `time=... ms`
/// in the ping output.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcmpProbe;

#[async_trait]
impl ProbeMethod for IcmpProbe {
    fn kind(&self) -> ProbeMethodKind {
        ProbeMethodKind::Icmp
    }

    async fn probe(&self, host: &str, _port: u16, timeout: Duration) -> ProbeOutcome {
        let wait_secs = timeout.as_secs().max(1);
        let mut cmd = Command::new("ping");
        cmd.arg("-c")
            .arg("1")
            .arg("-W")
            .arg(wait_secs.to_string())
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout + SPAWN_GRACE, cmd.output()).await {
            Ok(Ok(output)) => output,
            _ => return ProbeOutcome::failure(self.kind()),
        };

        let report = String::from_utf8_lossy(&output.stdout);
        match parse_ping_rtt(&report) {
            Some(rtt_ms) => ProbeOutcome::success(self.kind(), Some(rtt_ms)),
            None => ProbeOutcome::failure(self.kind()),
        }
    }
}

/// Scrape a round-trip time (milliseconds) out of ping output
pub(crate) fn parse_ping_rtt(report: &str) -> Option<f64> {
    static RTT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"time[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("valid ping rtt regex")
    });
    RTT.captures(report)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_parse_scanner_rtt_max_pattern() {
        let report = "Max rtt: 10.223ms | Min rtt: 10.223ms | Avg rtt: 10.223ms";
        assert_eq!(parse_scanner_rtt(report), Some(10.223));
    }

    #[test]
    fn test_parse_scanner_rtt_avg_pattern() {
        let report = "Avg rtt: 3.5ms";
        assert_eq!(parse_scanner_rtt(report), Some(3.5));
    }

    #[test]
    fn test_parse_scanner_rtt_missing() {
        assert_eq!(parse_scanner_rtt("Probe lost"), None);
        assert_eq!(parse_scanner_rtt(""), None);
    }

    #[test]
    fn test_parse_ping_rtt() {
        let report = "64 bytes from 127.0.0.1: icmp_seq=1 ttl=64 time=0.045 ms";
        assert_eq!(parse_ping_rtt(report), Some(0.045));
        assert_eq!(parse_ping_rtt("Request timeout for icmp_seq 0"), None);
    }

    #[test]
    fn test_probe_protocol_parse() {
        assert_eq!(ProbeProtocol::parse("tcp"), Some(ProbeProtocol::Tcp));
        assert_eq!(ProbeProtocol::parse("UDP"), Some(ProbeProtocol::Udp));
        assert_eq!(ProbeProtocol::parse("icmp"), Some(ProbeProtocol::Icmp));
        assert_eq!(ProbeProtocol::parse("arp"), None);
    }

    #[test]
    fn test_external_probe_tool_args_per_protocol() {
        let args = ExternalProbe::tcp().tool_args("example.test", 443);
        assert_eq!(args, vec!["--tcp", "-p", "443", "-c", "1", "example.test"]);

        let args = ExternalProbe::new(ProbeProtocol::Udp).tool_args("example.test", 53);
        assert_eq!(args, vec!["--udp", "-p", "53", "-c", "1", "example.test"]);

        // ICMP runs are port-less.
        let args = ExternalProbe::new(ProbeProtocol::Icmp).tool_args("example.test", 443);
        assert_eq!(args, vec!["--icmp", "-c", "1", "example.test"]);
    }

    #[test]
    fn test_probe_outcome_constructors() {
        let outcome = ProbeOutcome::success(ProbeMethodKind::Socket, Some(1.5));
        assert!(outcome.succeeded);
        assert_eq!(outcome.rtt_ms, Some(1.5));

        let outcome = ProbeOutcome::failure(ProbeMethodKind::Icmp);
        assert!(!outcome.succeeded);
        assert_eq!(outcome.rtt_ms, None);
    }

    #[tokio::test]
    async fn test_socket_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let outcome = SocketProbe
            .probe("127.0.0.1", port, Duration::from_secs(1))
            .await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.method, ProbeMethodKind::Socket);
        assert!(outcome.rtt_ms.is_some());
    }

    #[tokio::test]
    async fn test_socket_probe_closed_port() {
        // Bind then drop to find a loopback port nothing is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = SocketProbe
            .probe("127.0.0.1", port, Duration::from_secs(1))
            .await;
        assert!(!outcome.succeeded);
    }

    #[tokio::test]
    async fn test_socket_probe_unresolvable_host() {
        let outcome = SocketProbe
            .probe("host.invalid", 80, Duration::from_secs(1))
            .await;
        assert!(!outcome.succeeded);
    }
}
