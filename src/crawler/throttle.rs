//! Adaptive backoff between request starts
//!
//! Additive increase on slow responses, additive decrease after a streak of
//! fast ones. The backoff is shared by every worker of a scheduler.

use crate::config::SchedulerConfig;
use std::time::Duration;

/// Backoff controller fed with the latency of every completed fetch
///
/// A fetch slower than `timeout-before-throttle` adds one backoff step. Once
/// `min-sequential-successes-to-minimise-throttling` fast fetches follow in a
/// row, one step is removed again. The backoff never drops below zero.
#[derive(Debug, Clone)]
pub struct Throttle {
    backoff: Duration,
    successes: u32,
    step: Duration,
    threshold: Duration,
    min_successes: u32,
}

impl Throttle {
    /// Creates a throttle with no backoff, tuned by the scheduler options
    ///
    /// A zero `timeout-before-throttle` disables throttling entirely.
    pub fn new(options: &SchedulerConfig) -> Self {
        Self {
            backoff: Duration::ZERO,
            successes: 0,
            step: options.throttling_request_backoff(),
            threshold: options.timeout_before_throttle(),
            min_successes: options.min_sequential_successes_to_minimise_throttling,
        }
    }

    /// Current extra delay added to each request start
    pub fn current_backoff(&self) -> Duration {
        self.backoff
    }

    /// Feeds the latency of a completed fetch into the controller
    pub fn record(&mut self, latency: Duration) {
        if !self.threshold.is_zero() && latency > self.threshold {
            self.successes = 0;
            self.backoff += self.step;
            tracing::info!(
                "Slow response ({:?}), request backoff increased to {:?}",
                latency,
                self.backoff
            );
        } else if !self.backoff.is_zero() {
            self.successes += 1;
            if self.successes >= self.min_successes {
                self.backoff = self.backoff.saturating_sub(self.step);
                self.successes = 0;
                tracing::info!("Request backoff decreased to {:?}", self.backoff);
            }
        }
    }
}
