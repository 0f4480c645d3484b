//! Error types shared by the engine, the storage layer and the web layer

use thiserror::Error;

use crate::machine::{ContainerKind, Shortage};

/// Failure of the persistence collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unsupported storage type: {0}")]
    Unsupported(String),
}

/// Typed failure of a machine operation
///
/// Business rejections (`InvalidAmount`, `ContainerOverflow`,
/// `InsufficientResources`) never change state. `Persistence` means the new
/// state could not be saved and was therefore not applied.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("Invalid amount: {reason}. Amount: {amount}")]
    InvalidAmount { amount: f64, reason: String },

    #[error(
        "Cannot fill {container} container. Capacity is {capacity}, current level is {level}; \
         adding {attempted} would overflow (at most {max_fillable} can be added)"
    )]
    ContainerOverflow {
        container: ContainerKind,
        level: f64,
        capacity: f64,
        attempted: f64,
        max_fillable: f64,
    },

    #[error("{}", describe_shortages(.shortages))]
    InsufficientResources { shortages: Vec<Shortage> },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

impl MachineError {
    /// Stable identifier of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            MachineError::InvalidAmount { .. } => "InvalidAmount",
            MachineError::ContainerOverflow { .. } => "ContainerOverflow",
            MachineError::InsufficientResources { .. } => "InsufficientResources",
            MachineError::Persistence(_) => "PersistenceFailure",
        }
    }

    pub fn invalid_amount(amount: f64, reason: &str) -> Self {
        MachineError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        }
    }
}

fn describe_shortages(shortages: &[Shortage]) -> String {
    shortages
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
