//! API layer module.
//!
//! HTTP handlers, extractors, middleware, and routing for the users service.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
