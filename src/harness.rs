//! Simulated traffic driver.
//!
//! Sends requests from a fixed set of identities, chosen uniformly at random,
//! through an [`AdmissionBackend`] and logs each outcome.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::config::TrafficSettings;
use crate::error::{Result, TollgateError};
use crate::ratelimit::AdmissionBackend;

/// Tally of outcomes for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub accepted: u64,
    pub rejected: u64,
}

/// Outcome totals for a traffic run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficReport {
    pub accepted: u64,
    pub rejected: u64,
    pub per_identity: BTreeMap<String, Tally>,
}

impl TrafficReport {
    /// Total number of requests sent.
    pub fn total(&self) -> u64 {
        self.accepted + self.rejected
    }

    fn record(&mut self, identity: &str, admitted: bool) {
        let tally = self.per_identity.entry(identity.to_string()).or_default();
        if admitted {
            self.accepted += 1;
            tally.accepted += 1;
        } else {
            self.rejected += 1;
            tally.rejected += 1;
        }
    }
}

/// Drives simulated traffic against a backend.
pub struct TrafficGenerator<B: AdmissionBackend, R: Rng> {
    backend: Arc<B>,
    rng: R,
    identities: Vec<String>,
    iterations: u64,
    pause: Duration,
    report: TrafficReport,
}

impl<B: AdmissionBackend, R: Rng> TrafficGenerator<B, R> {
    /// Create a generator from traffic settings.
    pub fn new(backend: Arc<B>, settings: &TrafficSettings, rng: R) -> Result<Self> {
        if settings.identities.is_empty() {
            return Err(TollgateError::Config(
                "traffic requires at least one identity".to_string(),
            ));
        }

        Ok(Self {
            backend,
            rng,
            identities: settings.identities.clone(),
            iterations: settings.iterations,
            pause: Duration::from_millis(settings.pause_ms),
            report: TrafficReport::default(),
        })
    }

    /// Send one request from a randomly chosen identity.
    ///
    /// Returns the identity and whether it was admitted.
    pub async fn step(&mut self) -> (String, bool) {
        let index = self.rng.gen_range(0..self.identities.len());
        let identity = self.identities[index].clone();

        let admitted = self.backend.accept_request(&identity).await;
        if admitted {
            info!(client = %identity, "Client request: ACCEPTED");
        } else {
            info!(client = %identity, "Client request: REJECTED");
        }

        self.report.record(&identity, admitted);
        (identity, admitted)
    }

    /// Run the configured number of iterations, pausing between requests.
    ///
    /// Stops early once `shutdown` resolves.
    pub async fn run<F>(mut self, shutdown: F) -> TrafficReport
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            iterations = self.iterations,
            identities = self.identities.len(),
            pause_ms = self.pause.as_millis() as u64,
            "Starting simulated traffic"
        );

        for sent in 0..self.iterations {
            self.step().await;

            if sent + 1 == self.iterations {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    debug!(sent = sent + 1, "Traffic interrupted");
                    break;
                }
                _ = tokio::time::sleep(self.pause) => {}
            }
        }

        info!(
            accepted = self.report.accepted,
            rejected = self.report.rejected,
            "Simulated traffic finished"
        );

        self.report
    }

    /// Outcomes recorded so far.
    pub fn report(&self) -> &TrafficReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{LimiterConfig, ManualClock, WindowLimiter};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(identities: &[&str], iterations: u64) -> TrafficSettings {
        TrafficSettings {
            identities: identities.iter().map(|s| s.to_string()).collect(),
            iterations,
            pause_ms: 0,
            seed: None,
        }
    }

    fn backend(window_secs: u64, max: u64) -> (Arc<WindowLimiter<ManualClock>>, ManualClock) {
        let clock = ManualClock::new();
        let config = LimiterConfig::new(window_secs, max).unwrap();
        (Arc::new(WindowLimiter::with_clock(config, clock.clone())), clock)
    }

    #[test]
    fn test_empty_identities_rejected() {
        let (limiter, _clock) = backend(5, 2);
        let result = TrafficGenerator::new(limiter, &settings(&[], 10), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(TollgateError::Config(_))));
    }

    #[tokio::test]
    async fn test_single_identity_steps() {
        let (limiter, _clock) = backend(5, 2);
        let mut generator =
            TrafficGenerator::new(limiter, &settings(&["A"], 3), StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(generator.step().await, ("A".to_string(), true));
        assert_eq!(generator.step().await, ("A".to_string(), true));
        assert_eq!(generator.step().await, ("A".to_string(), false));

        let report = generator.report();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.per_identity["A"], Tally { accepted: 2, rejected: 1 });
    }

    #[tokio::test]
    async fn test_run_sends_every_iteration() {
        let (limiter, _clock) = backend(5, 2);
        let generator = TrafficGenerator::new(
            Arc::clone(&limiter),
            &settings(&["A", "B", "C"], 30),
            StdRng::seed_from_u64(7),
        )
        .unwrap();

        let report = generator.run(std::future::pending()).await;

        assert_eq!(report.total(), 30);
        // Each identity gets at most two admissions in the single window
        for (identity, tally) in &report.per_identity {
            let sent = tally.accepted + tally.rejected;
            assert_eq!(tally.accepted, sent.min(2));
            assert_eq!(limiter.count_for(identity), Some(sent));
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_traffic() {
        let (first, _) = backend(5, 2);
        let (second, _) = backend(5, 2);
        let traffic = settings(&["A", "B", "C"], 20);

        let a = TrafficGenerator::new(first, &traffic, StdRng::seed_from_u64(99))
            .unwrap()
            .run(std::future::pending())
            .await;
        let b = TrafficGenerator::new(second, &traffic, StdRng::seed_from_u64(99))
            .unwrap()
            .run(std::future::pending())
            .await;

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (limiter, _clock) = backend(5, 2);
        let mut traffic = settings(&["A"], 1000);
        traffic.pause_ms = 60_000;
        let generator =
            TrafficGenerator::new(limiter, &traffic, StdRng::seed_from_u64(3)).unwrap();

        let report = generator.run(async {}).await;

        assert_eq!(report.total(), 1);
    }

    #[tokio::test]
    async fn test_window_reset_between_steps() {
        let (limiter, clock) = backend(5, 1);
        let mut generator =
            TrafficGenerator::new(limiter, &settings(&["A"], 4), StdRng::seed_from_u64(5)).unwrap();

        assert!(generator.step().await.1);
        assert!(!generator.step().await.1);

        clock.advance(Duration::from_secs(6));
        assert!(generator.step().await.1);
    }
}
