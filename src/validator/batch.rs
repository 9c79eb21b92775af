//! Batch validator
//!
//! Drives the pipeline for each descriptor in input order: trim, classify,
//! extract the endpoint, tiered-probe it, keep or drop the original text,
//! then pause. The output is always an order-preserving subsequence of the
//! input. Safe mode bypasses the whole pipeline and only sanitizes.

use crate::descriptor::{self, Descriptor};
use crate::probe::TieredProber;
use crate::storage;
use crate::validator::{RateLimiter, ValidationOptions};
use crate::Result;

/// Order-preserving reachability filter over a descriptor batch
pub struct BatchValidator {
    options: ValidationOptions,
    prober: TieredProber,
    limiter: RateLimiter,
    safe_mode: bool,
}

impl BatchValidator {
    /// Create a validator with the standard probe tier and a uniform
    /// rate limiter built from the options' delay bounds.
    pub fn new(options: ValidationOptions) -> Self {
        let (min, max) = options.delay_bounds();
        Self {
            options,
            prober: TieredProber::new(),
            limiter: RateLimiter::uniform(min, max),
            safe_mode: false,
        }
    }

    /// Switch safe mode on or off. Fixed for the process lifetime in
    /// practice (read once from the environment at startup), explicit here
    /// so both modes are testable in one process.
    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }

    /// Replace the probe tier (tests script outcomes through this)
    pub fn with_prober(mut self, prober: TieredProber) -> Self {
        self.prober = prober;
        self
    }

    /// Replace the rate limiter (tests use a zero-delay one)
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Validate a batch of descriptor lines.
    ///
    /// Returns the surviving raw descriptor texts, trimmed of outer
    /// whitespace but otherwise unmodified, in their original relative
    /// order. Blank lines are skipped silently. A single bad descriptor
    /// never aborts the batch.
    pub async fn validate(&self, lines: &[String]) -> Vec<String> {
        if self.safe_mode {
            log::info!("safe mode active, skipping all connectivity probes");
            return sanitize(lines);
        }

        let mut kept = Vec::new();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let descriptor = Descriptor::parse(trimmed);
            match descriptor::extract(&descriptor) {
                None => {
                    log::info!("skipped [{}]: no endpoint found", descriptor.kind);
                }
                Some(endpoint) => {
                    if self.prober.evaluate(&endpoint, &self.options).await {
                        log::info!("kept [{}] {}: reachable", descriptor.kind, endpoint.host);
                        kept.push(trimmed.to_string());
                    } else {
                        log::info!(
                            "dropped [{}] {}: all probe methods exhausted",
                            descriptor.kind,
                            endpoint.host
                        );
                    }
                }
            }

            // One pause per evaluated descriptor, pass or fail alike, so
            // the emitted probe traffic never has a fixed cadence.
            self.limiter.wait().await;
        }

        kept
    }

    /// Validate a base64-encoded batch blob.
    ///
    /// The decoded content is newline-delimited descriptors (any line
    /// ending convention); the result is the base64 encoding of the
    /// newline-joined survivors. Pure codec wrapper around [`Self::validate`].
    pub async fn validate_blob(&self, blob: &str) -> Result<String> {
        let lines = storage::decode_blob(blob)?;
        let kept = self.validate(&lines).await;
        Ok(storage::encode_blob(&kept))
    }
}

/// Safe-mode sanitization: trim every entry, drop the empty ones
fn sanitize(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
