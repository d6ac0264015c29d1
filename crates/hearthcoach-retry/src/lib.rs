//! Reconnection backoff for Hearthcoach.
//!
//! Provides the [`ReconnectPolicy`] (how many retries, how far apart) and
//! the [`ReconnectTimer`] that owns the single pending reconnection
//! deadline of a session.
//!
//! # Schedule
//!
//! The delay before retry `n` is `n × step`. With the default policy
//! (5 attempts, 2 s step) that is 2 s, 4 s, 6 s, 8 s, 10 s, after which the
//! timer reports exhaustion and nothing is scheduled until the owner
//! calls [`ReconnectTimer::reset`]. The growth is linear on purpose.
//!
//! # Integration
//!
//! The timer is designed to sit inside a session actor's `tokio::select!`
//! loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         attempt = timer.wait() => {
//!             start_connect_attempt(attempt);
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// How a session retries after transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries allowed after consecutive failures. 0 disables reconnection.
    pub max_attempts: u32,
    /// Delay unit; retry `n` waits `n × step`.
    pub step: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            step: Self::DEFAULT_STEP,
        }
    }
}

impl ReconnectPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_STEP: Duration = Duration::from_secs(2);
    /// Hard cap on `max_attempts`; beyond this the delays stop meaning much.
    pub const MAX_ATTEMPTS_LIMIT: u32 = 100;

    /// Creates a policy with the given limits.
    pub fn new(max_attempts: u32, step: Duration) -> Self {
        Self { max_attempts, step }
    }

    /// Fix out-of-range values so the policy is safe to use.
    ///
    /// Called automatically by [`ReconnectTimer::new`]. Rules:
    /// - a zero `step` becomes [`Self::DEFAULT_STEP`] (a zero step would
    ///   hammer the server in a tight loop);
    /// - `max_attempts` is capped to [`Self::MAX_ATTEMPTS_LIMIT`].
    pub fn validated(mut self) -> Self {
        if self.step.is_zero() {
            warn!(
                default_ms = Self::DEFAULT_STEP.as_millis() as u64,
                "reconnect step is zero, using default"
            );
            self.step = Self::DEFAULT_STEP;
        }
        if self.max_attempts > Self::MAX_ATTEMPTS_LIMIT {
            warn!(
                max_attempts = self.max_attempts,
                limit = Self::MAX_ATTEMPTS_LIMIT,
                "reconnect max_attempts exceeds limit, clamping"
            );
            self.max_attempts = Self::MAX_ATTEMPTS_LIMIT;
        }
        self
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }

    /// The full retry schedule, in order.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_attempts).map(|n| self.delay_for(n))
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// The result of asking the timer to schedule another retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// Retry `attempt` will fire after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// All attempts are used up; nothing was scheduled.
    Exhausted,
}

/// Tracks consecutive failures and the one pending reconnection deadline.
///
/// Scheduling a new retry replaces any existing deadline, so at most one
/// reconnection is ever pending.
#[derive(Debug)]
pub struct ReconnectTimer {
    policy: ReconnectPolicy,
    attempts: u32,
    deadline: Option<Instant>,
}

impl ReconnectTimer {
    /// Creates an idle timer with no failures recorded.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy: policy.validated(),
            attempts: 0,
            deadline: None,
        }
    }

    /// Replaces the policy. The failure count and any pending deadline are
    /// kept; the new limits apply from the next failure.
    pub fn set_policy(&mut self, policy: ReconnectPolicy) {
        self.policy = policy.validated();
    }

    /// Records a failure and schedules the next retry if any remain.
    pub fn schedule_next(&mut self) -> Scheduled {
        if self.attempts >= self.policy.max_attempts {
            self.deadline = None;
            debug!(attempts = self.attempts, "reconnect attempts exhausted");
            return Scheduled::Exhausted;
        }

        self.attempts += 1;
        let delay = self.policy.delay_for(self.attempts);
        self.deadline = Some(Instant::now() + delay);
        debug!(
            attempt = self.attempts,
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );
        Scheduled::Retry {
            attempt: self.attempts,
            delay,
        }
    }

    /// Drops the pending deadline, if any. The failure count is kept.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            trace!(attempt = self.attempts, "pending reconnect cancelled");
        }
    }

    /// Cancels any pending deadline and forgets all failures.
    pub fn reset(&mut self) {
        self.cancel();
        self.attempts = 0;
    }

    /// Waits until the pending deadline passes and returns its attempt
    /// number.
    ///
    /// With nothing scheduled this future pends forever, so `select!` just
    /// services its other branches. Dropping the future before it
    /// completes leaves the deadline in place.
    pub async fn wait(&mut self) -> u32 {
        let Some(deadline) = self.deadline else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(deadline).await;

        self.deadline = None;
        trace!(attempt = self.attempts, "reconnect timer fired");
        self.attempts
    }

    /// Consecutive failures recorded since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether a reconnection is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending reconnection fires.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether every allowed attempt has been used.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}
