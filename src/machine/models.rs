//! Data models for the Machine State Engine

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::recipe::CoffeeType;

/// Identifies one of the two containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Water,
    Coffee,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Water => "water",
            ContainerKind::Coffee => "coffee",
        }
    }

    /// Display unit of the container's contents
    pub fn unit(self) -> &'static str {
        match self {
            ContainerKind::Water => "ml",
            ContainerKind::Coffee => "g",
        }
    }
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded resource pool
///
/// Invariant between operations: `0 <= level <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Maximum level, fixed at configuration time
    pub capacity: f64,
    /// Current level
    #[serde(rename = "current_amount")]
    pub level: f64,
}

impl Container {
    /// Create an empty container
    pub fn empty(capacity: f64) -> Self {
        Self {
            capacity,
            level: 0.0,
        }
    }

    /// Fill percentage; `0` when the capacity is `0`
    pub fn percentage(&self) -> f64 {
        if self.capacity > 0.0 {
            self.level / self.capacity * 100.0
        } else {
            0.0
        }
    }

    /// Largest amount that can still be added
    pub fn max_fillable(&self) -> f64 {
        (self.capacity - self.level).max(0.0)
    }
}

/// Configured container capacities
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Capacities {
    /// Water capacity in ml
    pub water: f64,
    /// Coffee capacity in g
    pub coffee: f64,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            water: 2000.0,
            coffee: 500.0,
        }
    }
}

/// The full persisted machine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    #[serde(rename = "water_container")]
    pub water: Container,
    #[serde(rename = "coffee_container")]
    pub coffee: Container,
    /// Successful brews since the last reset
    #[serde(default)]
    pub total_coffees_made: u64,
    /// Time of the last successful mutation
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl MachineState {
    /// Empty containers and a zero counter
    pub fn empty(capacities: Capacities) -> Self {
        Self {
            water: Container::empty(capacities.water),
            coffee: Container::empty(capacities.coffee),
            total_coffees_made: 0,
            last_updated: Utc::now(),
        }
    }

    pub fn container(&self, kind: ContainerKind) -> &Container {
        match kind {
            ContainerKind::Water => &self.water,
            ContainerKind::Coffee => &self.coffee,
        }
    }

    pub fn container_mut(&mut self, kind: ContainerKind) -> &mut Container {
        match kind {
            ContainerKind::Water => &mut self.water,
            ContainerKind::Coffee => &mut self.coffee,
        }
    }

    /// Adopt the configured capacities for a restored state
    ///
    /// Levels outside `[0, capacity]` are clamped back into range.
    pub fn conform_to(mut self, capacities: Capacities) -> Self {
        for (kind, capacity) in [
            (ContainerKind::Water, capacities.water),
            (ContainerKind::Coffee, capacities.coffee),
        ] {
            let container = self.container_mut(kind);
            if container.capacity != capacity {
                warn!(
                    "Persisted {} capacity {} differs from configured {}, using configured value",
                    kind, container.capacity, capacity
                );
                container.capacity = capacity;
            }

            if !container.level.is_finite() || container.level < 0.0 {
                warn!("Persisted {} level {} is invalid, resetting to 0", kind, container.level);
                container.level = 0.0;
            } else if container.level > capacity {
                warn!(
                    "Persisted {} level {} exceeds capacity {}, clamping",
                    kind, container.level, capacity
                );
                container.level = capacity;
            }
        }

        self
    }
}

/// Successful brew
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewResult {
    pub recipe: CoffeeType,
    pub message: String,
    pub total_coffees_made: u64,
}

/// Successful fill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillResult {
    pub container: ContainerKind,
    pub amount: f64,
    pub level: f64,
    pub capacity: f64,
}

/// Successful reset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetResult {
    pub message: String,
}

/// Read-only view of one container
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerStatus {
    pub level: f64,
    pub capacity: f64,
    /// Derived from level and capacity at snapshot time
    pub percentage: f64,
}

impl From<&Container> for ContainerStatus {
    fn from(container: &Container) -> Self {
        Self {
            level: container.level,
            capacity: container.capacity,
            percentage: container.percentage(),
        }
    }
}

/// Read-only view of the whole machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub water: ContainerStatus,
    pub coffee: ContainerStatus,
    pub total_coffees_made: u64,
    pub last_updated: DateTime<Utc>,
}

impl From<&MachineState> for StatusSnapshot {
    fn from(state: &MachineState) -> Self {
        Self {
            water: ContainerStatus::from(&state.water),
            coffee: ContainerStatus::from(&state.coffee),
            total_coffees_made: state.total_coffees_made,
            last_updated: state.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_handles_zero_capacity() {
        let container = Container {
            capacity: 0.0,
            level: 0.0,
        };
        assert_eq!(container.percentage(), 0.0);

        let half = Container {
            capacity: 2000.0,
            level: 1000.0,
        };
        assert_eq!(half.percentage(), 50.0);
    }

    #[test]
    fn test_serialized_layout() {
        let mut state = MachineState::empty(Capacities::default());
        state.water.level = 500.0;

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["water_container"]["current_amount"], 500.0);
        assert_eq!(value["water_container"]["capacity"], 2000.0);
        assert_eq!(value["coffee_container"]["capacity"], 500.0);
        assert_eq!(value["total_coffees_made"], 0);
        assert!(value["last_updated"].is_string());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{
            "water_container": {"capacity": 2000.0, "current_amount": 10.0},
            "coffee_container": {"capacity": 500.0, "current_amount": 5.0}
        }"#;

        let state: MachineState = serde_json::from_str(json).unwrap();
        assert_eq!(state.water.level, 10.0);
        assert_eq!(state.coffee.level, 5.0);
        assert_eq!(state.total_coffees_made, 0);
    }

    #[test]
    fn test_conform_to_clamps_levels() {
        let mut state = MachineState::empty(Capacities {
            water: 5000.0,
            coffee: 500.0,
        });
        state.water.level = 3000.0;
        state.coffee.level = -1.0;

        let conformed = state.conform_to(Capacities::default());

        assert_eq!(conformed.water.capacity, 2000.0);
        assert_eq!(conformed.water.level, 2000.0);
        assert_eq!(conformed.coffee.level, 0.0);
    }
}
