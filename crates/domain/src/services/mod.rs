//! Shared service helpers.

pub mod telemetry;

pub use telemetry::*;
