//! Exponential backoff for reconnection

use std::time::Duration;

use tl_core::config::BackoffConfig;

/// Exponential backoff with optional jitter for reconnection attempts
///
/// The delay is a pure function of the attempt count: `initial * 2^attempt`,
/// capped at `max`. The attempt counter itself lives in the session state
/// machine and resets to zero on any successful connection. Jitter, when
/// enabled, never pushes a delay past the cap.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    initial: Duration,
    /// Maximum delay
    max: Duration,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
}

impl BackoffPolicy {
    /// Create a new policy from configuration
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            initial: config.initial,
            max: config.max,
            jitter: config.jitter.clamp(0.0, 1.0),
        }
    }

    /// Create a new policy with custom parameters
    pub fn new(initial: Duration, max: Duration, jitter: f64) -> Self {
        Self {
            initial,
            max,
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let max = self.max.as_secs_f64();

        // Clamp the exponent so the f64 math can't blow up for huge counters
        let doubled = self.initial.as_secs_f64() * 2f64.powi(attempt.min(32) as i32);
        let base = doubled.min(max);

        let jittered = base + base * self.jitter * rand::random::<f64>();
        Duration::from_secs_f64(jittered.min(max))
    }
}
