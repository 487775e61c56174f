//! Domain-level building blocks shared by the engine, storage and API crates.
//!
//! Everything here is free of network and database code: the revenue data
//! model, the calendar arithmetic behind the three reporting windows, the
//! credential-store contract and the environment-driven configuration and
//! telemetry wiring every binary boots with.

pub mod config;
pub mod model;
pub mod services;
pub mod storage;

pub use model::*;
pub use storage::*;
