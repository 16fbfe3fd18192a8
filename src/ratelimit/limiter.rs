//! Core fixed-window limiter implementation.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::window::{LimiterConfig, WindowState};

/// Point-in-time view of a limiter's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Whole seconds since the current window started
    pub elapsed_secs: u64,
    /// Identities with at least one request in the current window
    pub tracked_identities: usize,
}

/// A fixed-window limiter keyed by identity.
///
/// All state lives behind a single mutex, so each decision (read the clock,
/// maybe reset, update the count, decide) is atomic with respect to other
/// callers on the same instance.
pub struct WindowLimiter<C: Clock = SystemClock> {
    config: LimiterConfig,
    clock: C,
    state: Mutex<WindowState>,
}

impl WindowLimiter<SystemClock> {
    /// Create a limiter driven by the system clock.
    pub fn new(config: LimiterConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> WindowLimiter<C> {
    /// Create a limiter reading time from `clock`.
    ///
    /// The first window starts now.
    pub fn with_clock(config: LimiterConfig, clock: C) -> Self {
        let state = WindowState::new(clock.now());
        Self {
            config,
            clock,
            state: Mutex::new(state),
        }
    }

    /// Decide whether a request from `identity` is admitted.
    ///
    /// Once more than `window_secs` whole seconds have passed since the window
    /// started, the window resets and the request is admitted. Otherwise the
    /// first request from an identity is always admitted and later ones are
    /// admitted while the count stays within `max_per_window`. The count keeps
    /// growing on rejection.
    pub fn accept_request(&self, identity: &str) -> bool {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let elapsed = state.elapsed_secs(now);

        if elapsed > self.config.window_secs() {
            debug!(
                elapsed_secs = elapsed,
                dropped = state.len(),
                "Window expired, resetting counters"
            );
            state.reset(now);
            state.record(identity);
            trace!(identity = %identity, "Admitted on window reset");
            return true;
        }

        let count = state.record(identity);
        let admitted = count == 1 || count <= self.config.max_per_window();

        trace!(
            identity = %identity,
            count = count,
            admitted = admitted,
            "Checked request"
        );

        if !admitted {
            debug!(
                identity = %identity,
                count = count,
                limit = self.config.max_per_window(),
                "Rate limit exceeded"
            );
        }

        admitted
    }

    /// The configuration this limiter was built with.
    pub fn config(&self) -> LimiterConfig {
        self.config
    }

    /// Count recorded for `identity` in the current window.
    ///
    /// Returns `None` if the identity has not been seen since the last reset.
    pub fn count_for(&self, identity: &str) -> Option<u64> {
        self.state.lock().count(identity)
    }

    /// Number of identities tracked in the current window.
    pub fn tracked_identities(&self) -> usize {
        self.state.lock().len()
    }

    /// When the current window started.
    pub fn window_start(&self) -> Instant {
        self.state.lock().window_start()
    }

    /// Elapsed time and tracked identity count for the current window.
    pub fn snapshot(&self) -> WindowSnapshot {
        let state = self.state.lock();
        WindowSnapshot {
            elapsed_secs: state.elapsed_secs(self.clock.now()),
            tracked_identities: state.len(),
        }
    }
}
