//! HTTP middleware.

pub mod metrics;
pub mod timeout;

pub use self::metrics::track_metrics;
pub use self::timeout::request_timeout;
