//! Core types and service wiring for the SahiBin waste scanner.

/// Bundle of injected external backends.
pub mod capabilities;
/// Static waste category metadata.
pub mod catalog;
/// Domain models shared by all crates.
pub mod model;
/// Storage backends for the statistics document.
pub mod persistence;
/// Traits describing the external backends.
pub mod ports;
/// Distance ranking of disposal facilities.
pub mod proximity;
/// High-level service facade used by the API surface.
pub mod service;
/// Serialized statistics aggregate.
pub mod stats;

pub use capabilities::*;
pub use catalog::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use stats::*;
