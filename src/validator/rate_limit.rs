//! Inter-evaluation rate limiter
//!
//! A fixed probing cadence is easy for a remote network to fingerprint as
//! automated scanning, so the pause between descriptor evaluations is drawn
//! uniformly from a configured range. The duration source is injected so
//! tests can substitute a deterministic one.

use rand::Rng;
use std::time::Duration;

type DelaySampler = Box<dyn Fn() -> Duration + Send + Sync>;

/// Randomized per-item pause between descriptor evaluations
pub struct RateLimiter {
    sampler: DelaySampler,
}

impl RateLimiter {
    /// Rate limiter drawing uniformly from `[min, max]`
    pub fn uniform(min: Duration, max: Duration) -> Self {
        Self {
            sampler: Box::new(move || {
                if max <= min {
                    return min;
                }
                let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
                Duration::from_secs_f64(secs)
            }),
        }
    }

    /// Rate limiter with a fixed delay (deterministic, for tests)
    pub fn fixed(delay: Duration) -> Self {
        Self {
            sampler: Box::new(move || delay),
        }
    }

    /// Rate limiter that never pauses
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    /// Draw one delay from the underlying source
    pub fn sample(&self) -> Duration {
        (self.sampler)()
    }

    /// Block the pipeline for one sampled delay
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
