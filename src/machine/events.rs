use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::ContainerKind;
use super::recipe::CoffeeType;

/// Notification published after a successful mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MachineEvent {
    CoffeeMade {
        recipe: CoffeeType,
        water_used: f64,
        coffee_used: f64,
        total_coffees_made: u64,
        timestamp: DateTime<Utc>,
    },
    ContainerFilled {
        container: ContainerKind,
        amount: f64,
        level: f64,
        timestamp: DateTime<Utc>,
    },
    MachineReset {
        timestamp: DateTime<Utc>,
    },
}
