//! Rate limiting logic and state management.

mod backend;
mod clock;
mod limiter;
mod window;

pub use backend::AdmissionBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{WindowLimiter, WindowSnapshot};
pub use window::{LimiterConfig, WindowState};
