//! Core implementation of the Machine State Engine
//!
//! This file contains the `CoffeeMachine` struct and its guarded operations.

use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{broadcast, Mutex};

use crate::core::error::{MachineError, StorageError};
use crate::storage::StateStore;

use super::events::MachineEvent;
use super::models::*;
use super::recipe::{CoffeeType, Recipe};

/// Buffered events per subscriber before it starts lagging
const EVENT_BUFFER: usize = 64;

/// Coffee machine
///
/// Owns the machine state and serializes every operation through one lock:
/// the precondition check, the mutation and the save all happen while the
/// lock is held, and the in-memory state is only replaced once the store has
/// accepted the new state.
pub struct CoffeeMachine {
    /// Configured capacities
    capacities: Capacities,
    /// Current state, guarded for the whole read-check-mutate-persist cycle
    state: Mutex<MachineState>,
    /// Persistence collaborator
    store: Arc<dyn StateStore>,
    /// Notifications of successful mutations
    events: broadcast::Sender<MachineEvent>,
}

impl CoffeeMachine {
    /// Restore the machine from `store`, or start empty if nothing was saved
    pub async fn initialize(
        capacities: Capacities,
        store: Arc<dyn StateStore>,
    ) -> Result<Self, StorageError> {
        let state = match store.load().await? {
            Some(restored) => {
                info!(
                    "Restored machine state from {} store: water={} coffee={} coffees_made={}",
                    store.kind(),
                    restored.water.level,
                    restored.coffee.level,
                    restored.total_coffees_made
                );
                restored.conform_to(capacities)
            }
            None => {
                info!("No persisted machine state, starting with empty containers");
                MachineState::empty(capacities)
            }
        };

        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Ok(Self {
            capacities,
            state: Mutex::new(state),
            store,
            events,
        })
    }

    pub fn capacities(&self) -> Capacities {
        self.capacities
    }

    /// The fixed recipe table
    pub fn recipes(&self) -> Vec<Recipe> {
        CoffeeType::ALL.iter().map(|c| c.recipe()).collect()
    }

    /// Receive notifications of successful operations
    pub fn subscribe(&self) -> broadcast::Receiver<MachineEvent> {
        self.events.subscribe()
    }

    /// Brew one beverage
    ///
    /// Both resources are checked before anything is deducted; on failure
    /// every short resource is reported and the state is untouched.
    pub async fn brew(&self, coffee_type: CoffeeType) -> Result<BrewResult, MachineError> {
        let recipe = coffee_type.recipe();
        let mut state = self.state.lock().await;

        let shortages = state.shortages_for(&recipe);
        if !shortages.is_empty() {
            let err = MachineError::InsufficientResources { shortages };
            warn!("Rejected {} brew: {}", coffee_type, err);
            return Err(err);
        }

        let mut next = state.clone();
        next.water.level -= recipe.water_cost;
        next.coffee.level -= recipe.coffee_cost;
        next.total_coffees_made += 1;
        next.last_updated = Utc::now();

        self.commit(&mut state, next).await?;

        info!(
            "Brewed {}: water={} coffee={} coffees_made={}",
            coffee_type, state.water.level, state.coffee.level, state.total_coffees_made
        );
        self.publish(MachineEvent::CoffeeMade {
            recipe: coffee_type,
            water_used: recipe.water_cost,
            coffee_used: recipe.coffee_cost,
            total_coffees_made: state.total_coffees_made,
            timestamp: state.last_updated,
        });

        Ok(BrewResult {
            recipe: coffee_type,
            message: coffee_type.ready_message().to_string(),
            total_coffees_made: state.total_coffees_made,
        })
    }

    /// Top up a container by `amount`
    pub async fn fill(&self, kind: ContainerKind, amount: f64) -> Result<FillResult, MachineError> {
        let mut state = self.state.lock().await;

        let new_level = match state.level_after_fill(kind, amount) {
            Ok(level) => level,
            Err(err) => {
                warn!("Rejected {} fill of {}: {}", kind, amount, err);
                return Err(err);
            }
        };

        let mut next = state.clone();
        next.container_mut(kind).level = new_level;
        next.last_updated = Utc::now();

        self.commit(&mut state, next).await?;

        let container = *state.container(kind);
        info!(
            "Filled {} with {}{}: now {}/{}",
            kind,
            amount,
            kind.unit(),
            container.level,
            container.capacity
        );
        self.publish(MachineEvent::ContainerFilled {
            container: kind,
            amount,
            level: container.level,
            timestamp: state.last_updated,
        });

        Ok(FillResult {
            container: kind,
            amount,
            level: container.level,
            capacity: container.capacity,
        })
    }

    /// Current levels, percentages and counter
    pub async fn status(&self) -> StatusSnapshot {
        StatusSnapshot::from(&*self.state.lock().await)
    }

    /// Empty both containers and zero the counter
    pub async fn reset(&self) -> Result<ResetResult, MachineError> {
        let mut state = self.state.lock().await;

        let next = MachineState::empty(self.capacities);
        self.commit(&mut state, next).await?;

        info!("Machine reset to empty state");
        self.publish(MachineEvent::MachineReset {
            timestamp: state.last_updated,
        });

        Ok(ResetResult {
            message: "Machine reset to empty state.".to_string(),
        })
    }

    /// Persist `next`, then make it the current state
    async fn commit(&self, current: &mut MachineState, next: MachineState) -> Result<(), MachineError> {
        if let Err(e) = self.store.save(&next).await {
            error!("Failed to persist machine state to {} store: {}", self.store.kind(), e);
            return Err(MachineError::Persistence(e));
        }

        *current = next;
        Ok(())
    }

    fn publish(&self, event: MachineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
