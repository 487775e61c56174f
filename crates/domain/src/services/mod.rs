//! Process-wide service wiring shared by the binaries.

pub mod telemetry;

pub use telemetry::*;
