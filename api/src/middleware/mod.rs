//! Middleware configuration for the API server

pub mod cors;

pub use cors::create_cors;
