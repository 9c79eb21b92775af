//! Proxy Sift - Proxy Descriptor Reachability Filter
//!
//! This is a reachability filter for proxy descriptor lists.
//! It extracts the endpoint out of each descriptor, probes it with a tiered
//! set of methods (external scanner, TCP connect, ICMP echo) and keeps only
//! the descriptors whose endpoint answered, in their original order.

pub mod descriptor;
pub mod probe;
pub mod storage;
pub mod validator;

pub use descriptor::{Descriptor, DescriptorKind, Endpoint};
pub use probe::{ProbeMethod, ProbeMethodKind, ProbeOutcome, TieredProber};
pub use validator::{BatchValidator, RateLimiter, ValidationOptions};

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Environment variable that switches the process into safe mode.
///
/// Safe mode disables all active probing: validation only trims entries and
/// drops empty ones. Meant for hosts where emitting scan traffic is not
/// acceptable (shared CI runners and the like).
pub const SAFE_MODE_ENV: &str = "PROXY_SIFT_SAFE_MODE";

/// Read the safe-mode switch from the environment. `"1"` means active,
/// anything else (including unset) means inactive. Read once at startup;
/// the resulting flag is threaded into [`BatchValidator`] explicitly.
pub fn safe_mode_from_env() -> bool {
    std::env::var(SAFE_MODE_ENV).map(|v| v == "1").unwrap_or(false)
}
