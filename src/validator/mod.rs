//! Validator module for rate-limited batch reachability filtering
//!
//! This module provides functionality for:
//! - Validation options with builder-style overrides
//! - A randomized inter-evaluation rate limiter
//! - The batch validator that drives extraction, tiered probing and
//!   order-preserving filtering, with a full safe-mode bypass

pub mod batch;
pub mod options;
pub mod rate_limit;

pub use batch::BatchValidator;
pub use options::ValidationOptions;
pub use rate_limit::RateLimiter;
