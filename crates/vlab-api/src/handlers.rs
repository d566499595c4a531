//! Request handlers.

pub mod functions;
pub mod health;

pub use health::*;
