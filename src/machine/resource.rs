//! Resource accounting rules
//!
//! The checks here are pure: they look at a state and decide whether an
//! operation may proceed. Mutation happens in the engine once every check
//! has passed.

use std::fmt::{self, Display};

use serde::Serialize;

use crate::core::error::MachineError;

use super::models::{ContainerKind, MachineState};
use super::recipe::Recipe;

/// A resource that cannot cover a recipe's cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shortage {
    pub resource: ContainerKind,
    pub requested: f64,
    pub available: f64,
    pub shortfall: f64,
}

impl Shortage {
    pub fn new(resource: ContainerKind, requested: f64, available: f64) -> Self {
        Self {
            resource,
            requested,
            available,
            shortfall: requested - available,
        }
    }
}

impl Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.resource.unit();
        write!(
            f,
            "Not enough {}. Need {}{} but only {}{} available.",
            self.resource, self.requested, unit, self.available, unit
        )
    }
}

/// Reject fill amounts that are not strictly positive finite numbers
pub fn validate_fill_amount(amount: f64) -> Result<f64, MachineError> {
    if !amount.is_finite() {
        return Err(MachineError::invalid_amount(amount, "Amount must be a finite number"));
    }
    if amount <= 0.0 {
        return Err(MachineError::invalid_amount(amount, "Amount must be greater than 0"));
    }
    Ok(amount)
}

impl MachineState {
    /// Every resource that is short for `recipe`, water first
    pub fn shortages_for(&self, recipe: &Recipe) -> Vec<Shortage> {
        [
            (ContainerKind::Water, recipe.water_cost),
            (ContainerKind::Coffee, recipe.coffee_cost),
        ]
        .into_iter()
        .filter_map(|(kind, cost)| {
            let available = self.container(kind).level;
            if available >= cost {
                None
            } else {
                Some(Shortage::new(kind, cost, available))
            }
        })
        .collect()
    }

    /// Level the container would have after adding `amount`
    ///
    /// The returned level is the exact value that was checked against the
    /// capacity, so storing it can never overshoot.
    pub fn level_after_fill(&self, kind: ContainerKind, amount: f64) -> Result<f64, MachineError> {
        let amount = validate_fill_amount(amount)?;
        let container = self.container(kind);
        let new_level = container.level + amount;

        if new_level > container.capacity {
            return Err(MachineError::ContainerOverflow {
                container: kind,
                level: container.level,
                capacity: container.capacity,
                attempted: amount,
                max_fillable: container.max_fillable(),
            });
        }

        Ok(new_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Capacities, CoffeeType};

    fn state_with(water: f64, coffee: f64) -> MachineState {
        let mut state = MachineState::empty(Capacities::default());
        state.water.level = water;
        state.coffee.level = coffee;
        state
    }

    #[test]
    fn test_no_shortage_when_exactly_enough() {
        let state = state_with(24.0, 8.0);
        assert!(state.shortages_for(&CoffeeType::Espresso.recipe()).is_empty());
    }

    #[test]
    fn test_reports_both_shortages() {
        let state = state_with(10.0, 2.0);
        let shortages = state.shortages_for(&CoffeeType::Espresso.recipe());

        assert_eq!(
            shortages,
            vec![
                Shortage::new(ContainerKind::Water, 24.0, 10.0),
                Shortage::new(ContainerKind::Coffee, 8.0, 2.0),
            ]
        );
        assert_eq!(shortages[0].shortfall, 14.0);
        assert_eq!(shortages[1].shortfall, 6.0);
    }

    #[test]
    fn test_reports_only_short_resource() {
        let state = state_with(500.0, 4.0);
        let shortages = state.shortages_for(&CoffeeType::Espresso.recipe());

        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].resource, ContainerKind::Coffee);
    }

    #[test]
    fn test_validate_fill_amount() {
        assert!(validate_fill_amount(0.1).is_ok());
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_fill_amount(bad),
                Err(MachineError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn test_fill_up_to_capacity() {
        let state = state_with(0.0, 0.0);
        assert_eq!(state.level_after_fill(ContainerKind::Water, 2000.0).unwrap(), 2000.0);
    }

    #[test]
    fn test_overflow_reports_max_fillable() {
        let state = state_with(1500.0, 0.0);
        match state.level_after_fill(ContainerKind::Water, 600.0) {
            Err(MachineError::ContainerOverflow {
                container,
                level,
                capacity,
                attempted,
                max_fillable,
            }) => {
                assert_eq!(container, ContainerKind::Water);
                assert_eq!(level, 1500.0);
                assert_eq!(capacity, 2000.0);
                assert_eq!(attempted, 600.0);
                assert_eq!(max_fillable, 500.0);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }
}
