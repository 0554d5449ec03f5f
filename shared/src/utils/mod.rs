//! Common utility functions

pub mod identifier;
pub mod validation;

// Re-export commonly used utilities
pub use identifier::*;
pub use validation::*;
