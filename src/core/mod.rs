//! Shared plumbing for the coffee machine: error types and metrics

pub mod error;
pub mod metrics;

pub use error::{MachineError, StorageError};
pub use metrics::MachineMetrics;
