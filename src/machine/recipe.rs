//! The fixed recipe table

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Beverages the machine can brew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoffeeType {
    /// Single shot
    Espresso,
    /// Two shots
    DoubleEspresso,
    /// Short shot, same grounds with less water
    Ristretto,
    /// Double shot topped up with hot water
    Americano,
}

/// Water and coffee consumed by one brew
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recipe {
    pub name: CoffeeType,
    /// Water consumed in ml
    pub water_cost: f64,
    /// Coffee grounds consumed in g
    pub coffee_cost: f64,
}

/// Identifier that does not name a recipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown coffee type: {0}")]
pub struct UnknownRecipe(pub String);

impl CoffeeType {
    pub const ALL: [CoffeeType; 4] = [
        CoffeeType::Espresso,
        CoffeeType::DoubleEspresso,
        CoffeeType::Ristretto,
        CoffeeType::Americano,
    ];

    pub fn recipe(self) -> Recipe {
        let (coffee_cost, water_cost) = match self {
            CoffeeType::Espresso => (8.0, 24.0),
            CoffeeType::DoubleEspresso => (16.0, 48.0),
            CoffeeType::Ristretto => (8.0, 16.0),
            CoffeeType::Americano => (16.0, 148.0),
        };

        Recipe {
            name: self,
            water_cost,
            coffee_cost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoffeeType::Espresso => "espresso",
            CoffeeType::DoubleEspresso => "double-espresso",
            CoffeeType::Ristretto => "ristretto",
            CoffeeType::Americano => "americano",
        }
    }

    pub fn ready_message(self) -> &'static str {
        match self {
            CoffeeType::Espresso => "Espresso ready!",
            CoffeeType::DoubleEspresso => "Double espresso ready!",
            CoffeeType::Ristretto => "Ristretto ready!",
            CoffeeType::Americano => "Americano ready!",
        }
    }
}

impl Display for CoffeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoffeeType {
    type Err = UnknownRecipe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "espresso" => Ok(CoffeeType::Espresso),
            "double-espresso" | "double_espresso" => Ok(CoffeeType::DoubleEspresso),
            "ristretto" => Ok(CoffeeType::Ristretto),
            "americano" => Ok(CoffeeType::Americano),
            other => Err(UnknownRecipe(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_costs() {
        let espresso = CoffeeType::Espresso.recipe();
        assert_eq!(espresso.water_cost, 24.0);
        assert_eq!(espresso.coffee_cost, 8.0);

        let double = CoffeeType::DoubleEspresso.recipe();
        assert_eq!((double.water_cost, double.coffee_cost), (48.0, 16.0));

        let ristretto = CoffeeType::Ristretto.recipe();
        assert_eq!((ristretto.water_cost, ristretto.coffee_cost), (16.0, 8.0));

        let americano = CoffeeType::Americano.recipe();
        assert_eq!((americano.water_cost, americano.coffee_cost), (148.0, 16.0));
    }

    #[test]
    fn test_parse_identifiers() {
        for coffee_type in CoffeeType::ALL {
            assert_eq!(coffee_type.as_str().parse::<CoffeeType>(), Ok(coffee_type));
        }
        assert_eq!("double_espresso".parse::<CoffeeType>(), Ok(CoffeeType::DoubleEspresso));
        assert_eq!(
            "latte".parse::<CoffeeType>(),
            Err(UnknownRecipe("latte".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_identifiers() {
        let json = serde_json::to_string(&CoffeeType::DoubleEspresso).unwrap();
        assert_eq!(json, "\"double-espresso\"");
    }
}
