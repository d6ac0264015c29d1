//! Integration tests for the reconnection policy and timer.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when every task
//! is idle, which makes the delays deterministic and the tests instant.

use std::time::Duration;

use hearthcoach_retry::{ReconnectPolicy, ReconnectTimer, Scheduled};
use tokio::time::Instant;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Paused time advances in whole timer-wheel ticks (1 ms), so allow for
/// rounding up to the next tick.
fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// =========================================================================
// ReconnectPolicy
// =========================================================================

#[test]
fn test_default_policy_is_five_attempts_two_second_step() {
    let policy = ReconnectPolicy::default();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.step, secs(2));
}

#[test]
fn test_default_schedule_is_linear() {
    let schedule: Vec<_> = ReconnectPolicy::default().schedule().collect();
    assert_eq!(schedule, vec![secs(2), secs(4), secs(6), secs(8), secs(10)]);
}

#[test]
fn test_validated_replaces_zero_step() {
    let policy = ReconnectPolicy::new(3, Duration::ZERO).validated();
    assert_eq!(policy.step, ReconnectPolicy::DEFAULT_STEP);
    assert_eq!(policy.max_attempts, 3);
}

#[test]
fn test_validated_caps_max_attempts() {
    let policy = ReconnectPolicy::new(10_000, secs(1)).validated();
    assert_eq!(policy.max_attempts, ReconnectPolicy::MAX_ATTEMPTS_LIMIT);
}

// =========================================================================
// ReconnectTimer: scheduling
// =========================================================================

#[test]
fn test_new_timer_is_idle() {
    let timer = ReconnectTimer::new(ReconnectPolicy::default());
    assert_eq!(timer.attempts(), 0);
    assert!(!timer.is_pending());
    assert!(!timer.is_exhausted());
}

#[tokio::test(start_paused = true)]
async fn test_schedule_next_counts_up_to_max_then_exhausts() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());

    for n in 1..=5u32 {
        assert_eq!(
            timer.schedule_next(),
            Scheduled::Retry {
                attempt: n,
                delay: secs(2 * n as u64),
            }
        );
        assert!(timer.is_pending());
    }

    assert!(timer.is_exhausted());
    assert_eq!(timer.schedule_next(), Scheduled::Exhausted);
    assert!(!timer.is_pending(), "nothing pending after exhaustion");
    assert_eq!(timer.attempts(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_zero_max_attempts_never_schedules() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::new(0, secs(2)));
    assert_eq!(timer.schedule_next(), Scheduled::Exhausted);
    assert_eq!(timer.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_keeps_attempt_count() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    timer.schedule_next();
    timer.schedule_next();

    timer.cancel();

    assert!(!timer.is_pending());
    assert_eq!(timer.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_everything() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    for _ in 0..5 {
        timer.schedule_next();
    }

    timer.reset();

    assert_eq!(timer.attempts(), 0);
    assert!(!timer.is_pending());
    assert!(matches!(
        timer.schedule_next(),
        Scheduled::Retry { attempt: 1, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_set_policy_keeps_count_and_applies_new_limits() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    timer.schedule_next();
    timer.schedule_next();

    timer.set_policy(ReconnectPolicy::new(2, secs(1)));

    assert_eq!(timer.attempts(), 2);
    assert!(timer.is_pending());
    assert!(timer.is_exhausted());
    assert_eq!(timer.schedule_next(), Scheduled::Exhausted);
}

// =========================================================================
// ReconnectTimer: waiting
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_fires_after_exact_delay() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    let start = Instant::now();

    timer.schedule_next();
    let attempt = timer.wait().await;

    assert_eq!(attempt, 1);
    assert_elapsed(start, secs(2));
    assert!(!timer.is_pending(), "deadline is consumed when it fires");
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_waits_follow_schedule() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());

    for n in 1..=3u64 {
        timer.schedule_next();
        let before = Instant::now();
        timer.wait().await;
        assert_elapsed(before, secs(2 * n));
    }
    assert_eq!(timer.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_wait_pends_when_nothing_scheduled() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());

    let result =
        tokio::time::timeout(secs(3600), timer.wait()).await;

    assert!(result.is_err(), "idle timer must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_timer_does_not_fire() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    timer.schedule_next();
    timer.cancel();

    let result = tokio::time::timeout(secs(60), timer.wait()).await;

    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_wait_keeps_deadline() {
    let mut timer = ReconnectTimer::new(ReconnectPolicy::default());
    timer.schedule_next();

    // Lose a select race: the wait future is dropped before it fires.
    let _ = tokio::time::timeout(Duration::from_millis(500), timer.wait()).await;
    assert!(timer.is_pending());

    let start = Instant::now();
    timer.wait().await;
    assert_elapsed(start, Duration::from_millis(1500));
}
