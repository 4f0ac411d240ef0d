//! Waypoint Core - Fundamental types and utilities

mod error;
mod types;

pub use error::*;
pub use types::*;
