//! Probe module for endpoint reachability testing
//!
//! This module provides functionality for:
//! - Single reachability probes behind a common [`ProbeMethod`] trait
//! - An external high-precision scanner probe, a plain TCP connect probe
//!   and an ICMP echo fallback
//! - Tiered evaluation of one endpoint across fallback ports and methods

pub mod methods;
pub mod tiered;

pub use methods::{
    external_probe_path, ExternalProbe, IcmpProbe, ProbeMethod, ProbeMethodKind, ProbeOutcome,
    ProbeProtocol, SocketProbe,
};
pub use tiered::TieredProber;
