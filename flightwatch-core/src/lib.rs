//! flightwatch-core: Pure windowing + aggregation library for flight observations.
//!
//! No async, no I/O — just algorithms. This crate is the shared core used by
//! `flightwatch-collector` (feed polling, persistence, CLI).

pub mod aggregate;
pub mod config;
pub mod geo;
pub mod types;
pub mod window;

// Re-export commonly used types at crate root
pub use aggregate::{airline_counts, model_counts, FrequencyTable};
pub use geo::filter_inside;
pub use types::*;
pub use window::{MergeStats, Window, RETENTION_HORIZON_SECS};
