//! Machine State Engine
//!
//! This module owns the coffee machine's resource accounting:
//! - two bounded containers (water in ml, coffee grounds in g)
//! - the fixed recipe table
//! - a lifetime brew counter
//!
//! All mutations go through [`CoffeeMachine`], which serializes
//! read-check-mutate-persist into one critical section per operation.

mod engine;
mod events;
mod models;
mod recipe;
mod resource;

// Re-export main components
pub use engine::CoffeeMachine;
pub use events::MachineEvent;
pub use models::{
    BrewResult, Capacities, Container, ContainerKind, ContainerStatus, FillResult, MachineState,
    ResetResult, StatusSnapshot,
};
pub use recipe::{CoffeeType, Recipe, UnknownRecipe};
pub use resource::{validate_fill_amount, Shortage};
