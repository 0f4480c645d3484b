use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::error::StorageError;
use crate::machine::MachineState;

use super::StateStore;

/// Non-durable store that keeps the last saved state in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<MachineState>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out holding `state`
    pub fn with_state(state: MachineState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The last saved state
    pub async fn snapshot(&self) -> Option<MachineState> {
        self.state.lock().await.clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Option<MachineState>, StorageError> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &MachineState) -> Result<(), StorageError> {
        *self.state.lock().await = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
