use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::MachineError;
use crate::machine::{validate_fill_amount, CoffeeType, StatusSnapshot};

/// Largest amount accepted in a single fill request
pub const MAX_FILL_AMOUNT: f64 = 10_000.0;

/// Fill request
#[derive(Debug, Deserialize)]
pub struct FillRequest {
    /// Amount to add (ml for water, g for coffee)
    pub amount: f64,
}

impl FillRequest {
    /// Boundary validation before the request reaches the engine
    pub fn validate(&self) -> Result<f64, MachineError> {
        let amount = validate_fill_amount(self.amount)?;
        if amount > MAX_FILL_AMOUNT {
            return Err(MachineError::invalid_amount(
                amount,
                &format!("Amount too large. Maximum: {}", MAX_FILL_AMOUNT),
            ));
        }
        Ok(amount)
    }
}

/// Generic response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Brew response
#[derive(Debug, Serialize)]
pub struct BrewResponse {
    pub success: bool,
    pub message: String,
    pub recipe: CoffeeType,
}

/// Machine status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: StatusData,
}

/// Flattened status with display-rounded percentages
#[derive(Debug, Serialize)]
pub struct StatusData {
    pub water_level: f64,
    pub water_capacity: f64,
    pub water_percentage: f64,
    pub coffee_level: f64,
    pub coffee_capacity: f64,
    pub coffee_percentage: f64,
    pub total_coffees_made: u64,
    pub last_updated: DateTime<Utc>,
}

impl From<StatusSnapshot> for StatusData {
    fn from(status: StatusSnapshot) -> Self {
        Self {
            water_level: status.water.level,
            water_capacity: status.water.capacity,
            water_percentage: round2(status.water.percentage),
            coffee_level: status.coffee.level,
            coffee_capacity: status.coffee.capacity,
            coffee_percentage: round2(status.coffee.percentage),
            total_coffees_made: status.total_coffees_made,
            last_updated: status.last_updated,
        }
    }
}

/// Configured container capacities
#[derive(Debug, Serialize)]
pub struct ContainerConfigResponse {
    pub water_capacity: f64,
    pub coffee_capacity: f64,
    pub max_fill_amount: f64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error_type: String,
    pub details: serde_json::Value,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_request_validation() {
        assert_eq!(FillRequest { amount: 500.0 }.validate().unwrap(), 500.0);
        assert!(FillRequest { amount: 0.0 }.validate().is_err());
        assert!(FillRequest { amount: -1.0 }.validate().is_err());

        match (FillRequest { amount: 10_001.0 }).validate() {
            Err(MachineError::InvalidAmount { reason, .. }) => {
                assert!(reason.contains("Maximum: 10000"));
            }
            other => panic!("expected InvalidAmount, got {:?}", other),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
