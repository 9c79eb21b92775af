//! Validation configuration

use std::time::Duration;

/// Default per-probe timeout in seconds
const DEFAULT_TIMEOUT_SECS: f64 = 3.0;

/// Default fallback ports, tried in order when the descriptor's own port
/// fails or is unspecified
const DEFAULT_FALLBACK_PORTS: &[u16] = &[443, 80, 53];

/// Default bounds of the randomized inter-evaluation pause in seconds
const DEFAULT_MIN_DELAY_SECS: f64 = 0.5;
const DEFAULT_MAX_DELAY_SECS: f64 = 1.5;

/// Configuration for batch validation
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Per-probe timeout ceiling in seconds
    pub timeout_seconds: f64,
    /// Ports tried after (or instead of) the descriptor's own port
    pub fallback_ports: Vec<u16>,
    /// Lower bound of the randomized inter-evaluation pause, seconds
    pub min_delay: f64,
    /// Upper bound of the randomized inter-evaluation pause, seconds
    pub max_delay: f64,
    /// Whether a file-backed batch is overwritten in place (storage-layer
    /// concern, threaded through here for the CLI)
    pub replace: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            fallback_ports: DEFAULT_FALLBACK_PORTS.to_vec(),
            min_delay: DEFAULT_MIN_DELAY_SECS,
            max_delay: DEFAULT_MAX_DELAY_SECS,
            replace: false,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_fallback_ports(mut self, fallback_ports: Vec<u16>) -> Self {
        self.fallback_ports = fallback_ports;
        self
    }

    pub fn with_delay_bounds(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Per-probe timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds.max(0.0))
    }

    /// Inter-evaluation delay bounds as durations
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        let min = Duration::from_secs_f64(self.min_delay.max(0.0));
        let max = Duration::from_secs_f64(self.max_delay.max(self.min_delay).max(0.0));
        (min, max)
    }
}
