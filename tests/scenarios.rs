use std::time::Duration;

use tollgate::ratelimit::{LimiterConfig, ManualClock, WindowLimiter};

fn limiter(window_secs: u64, max: u64) -> (WindowLimiter<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let config = LimiterConfig::new(window_secs, max).unwrap();
    (WindowLimiter::with_clock(config, clock.clone()), clock)
}

#[test]
fn test_limit_reached_within_one_window() {
    let (limiter, _clock) = limiter(5, 2);

    assert!(limiter.accept_request("A"));
    assert!(limiter.accept_request("A"));
    assert!(!limiter.accept_request("A"));
}

#[test]
fn test_window_expiry_resets_all_identities() {
    let (limiter, clock) = limiter(5, 2);

    assert!(limiter.accept_request("A"));
    assert!(limiter.accept_request("B"));
    assert_eq!(limiter.count_for("B"), Some(1));

    clock.advance(Duration::from_secs(6));
    assert!(limiter.accept_request("A"));

    assert_eq!(limiter.count_for("A"), Some(1));
    assert_eq!(limiter.count_for("B"), None);
    assert_eq!(limiter.tracked_identities(), 1);
}

#[test]
fn test_zero_limit_admits_first_request_in_window() {
    let (limiter, _clock) = limiter(5, 0);

    assert!(limiter.accept_request("A"));
    assert!(!limiter.accept_request("A"));
}

#[test]
fn test_interleaved_identities_share_a_window() {
    let (limiter, _clock) = limiter(5, 2);

    let outcomes: Vec<bool> = ["A", "B", "A", "B", "A", "B"]
        .iter()
        .map(|id| limiter.accept_request(id))
        .collect();

    assert_eq!(outcomes, vec![true, true, true, true, false, false]);
}

#[test]
fn test_n_requests_admitted_then_rejected_for_any_limit() {
    for max in 1..=8 {
        let (limiter, _clock) = limiter(30, max);

        for _ in 0..max {
            assert!(limiter.accept_request("client"));
        }
        assert!(!limiter.accept_request("client"));
        assert!(!limiter.accept_request("client"));
        assert_eq!(limiter.count_for("client"), Some(max + 2));
    }
}

#[test]
fn test_request_exactly_at_window_length_uses_normal_path() {
    let (limiter, clock) = limiter(5, 2);
    let start = limiter.window_start();

    limiter.accept_request("A");
    limiter.accept_request("A");

    clock.advance(Duration::from_secs(5));
    assert!(!limiter.accept_request("A"));
    assert_eq!(limiter.window_start(), start);

    clock.advance(Duration::from_secs(1));
    assert!(limiter.accept_request("A"));
    assert_ne!(limiter.window_start(), start);
}

#[test]
fn test_reset_admits_regardless_of_prior_state() {
    let (limiter, clock) = limiter(5, 0);

    assert!(limiter.accept_request("A"));
    for _ in 0..10 {
        assert!(!limiter.accept_request("A"));
    }

    clock.advance(Duration::from_secs(60));
    assert!(limiter.accept_request("A"));
}
