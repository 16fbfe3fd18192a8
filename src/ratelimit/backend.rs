//! Admission trait for abstracting limiter implementations.

use async_trait::async_trait;

use super::clock::Clock;
use super::limiter::WindowLimiter;

/// Trait for anything that can admit or reject a request by identity.
///
/// Traffic drivers are written against this trait rather than a concrete
/// limiter.
#[async_trait]
pub trait AdmissionBackend: Send + Sync {
    /// Decide whether a request from `identity` is admitted.
    async fn accept_request(&self, identity: &str) -> bool;
}

#[async_trait]
impl<C: Clock> AdmissionBackend for WindowLimiter<C> {
    async fn accept_request(&self, identity: &str) -> bool {
        WindowLimiter::accept_request(self, identity)
    }
}
