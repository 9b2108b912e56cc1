//! mecscale-core — shared types for the scaling policy evaluator.
//!
//! Holds the data model (`Decision`, `PolicyKind`, `Workload`), the
//! `PolicyError` taxonomy, `mecscale.toml` parsing, and load traces.

pub mod config;
pub mod error;
pub mod trace;
pub mod types;

pub use config::{MecscaleConfig, PolicyConfig};
pub use error::{PolicyError, PolicyResult};
pub use trace::Snapshot;
pub use types::*;
