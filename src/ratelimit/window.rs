//! Fixed window configuration and per-window state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{Result, TollgateError};

/// Window length and admission limit for a limiter.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    window_secs: u64,
    max_per_window: u64,
}

impl LimiterConfig {
    /// Create a configuration.
    ///
    /// A zero-length window is rejected. A `max_per_window` of zero is
    /// accepted; the limiter still admits the first request per identity in
    /// each window.
    pub fn new(window_secs: u64, max_per_window: u64) -> Result<Self> {
        if window_secs == 0 {
            return Err(TollgateError::Config(
                "window_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window_secs,
            max_per_window,
        })
    }

    /// Window length in whole seconds.
    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Maximum admissions per identity within one window.
    pub fn max_per_window(&self) -> u64 {
        self.max_per_window
    }

    /// Window length as a `Duration`.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Mutable state for the current window.
///
/// Every key in `counts` maps to a value of at least one; an absent identity
/// has no admissions recorded in this window.
#[derive(Debug, Clone)]
pub struct WindowState {
    window_start: Instant,
    counts: HashMap<String, u64>,
}

impl WindowState {
    /// Create an empty window starting at `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            window_start: start,
            counts: HashMap::new(),
        }
    }

    /// When the current window started.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Whole seconds elapsed since the window started, truncated.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.window_start).as_secs()
    }

    /// Start a fresh window at `now`, dropping every recorded count.
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Record one request for `identity` and return its new count.
    pub fn record(&mut self, identity: &str) -> u64 {
        match self.counts.get_mut(identity) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.insert(identity.to_string(), 1);
                1
            }
        }
    }

    /// Count recorded for `identity` in this window.
    pub fn count(&self, identity: &str) -> Option<u64> {
        self.counts.get(identity).copied()
    }

    /// Number of identities tracked in this window.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no identity has been seen since the window started.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
