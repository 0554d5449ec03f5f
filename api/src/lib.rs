//! HTTP surface of the passcode service
//!
//! Exposed as a library so integration tests can build the same application
//! the binary serves.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::otp::AppState;
