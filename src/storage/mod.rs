//! Persistence collaborators for the machine state
//!
//! The engine only sees [`StateStore`]; the concrete backend is chosen from
//! configuration at startup.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::config::Settings;
use crate::core::error::StorageError;
use crate::machine::MachineState;

mod json;
mod memory;
mod sqlite;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable home of the machine state
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Short name of the backend, for health reports
    fn kind(&self) -> &'static str;

    /// Previously persisted state, or `None` when nothing was saved yet
    async fn load(&self) -> Result<Option<MachineState>, StorageError>;

    /// Durably replace the persisted state
    async fn save(&self, state: &MachineState) -> Result<(), StorageError>;
}

/// Open the backend named by `settings.storage_type`
pub fn open_store(settings: &Settings) -> Result<Arc<dyn StateStore>, StorageError> {
    match settings.storage_type.as_str() {
        "json" => Ok(Arc::new(JsonFileStore::new(&settings.data_path))),
        "sqlite" => Ok(Arc::new(SqliteStore::open(&settings.data_path)?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(StorageError::Unsupported(other.to_string())),
    }
}
