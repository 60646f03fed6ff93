use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Inclusive bounds for a criteria weight.
pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 5.0;

/// A named, weighted rating dimension attached to one restaurant.
///
/// Typical names: "Terrasse", "Accueil", "Rapport qualité/prix",
/// "Végétarien", "Sans-gluten", "Hallal". The names are free-form;
/// only the weight is constrained.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Criteria {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub comment: String,
    pub weight: f64, // Always within [MIN_WEIGHT, MAX_WEIGHT] once stored
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewCriteria {
    pub name: String,
    pub comment: String,
    pub weight: f64,
}

/// Checks the weight bounds before any write touches the store, so a
/// rejected write leaves prior state unchanged.
pub fn validate_weight(weight: f64) -> Result<(), StoreError> {
    if weight < MIN_WEIGHT {
        return Err(StoreError::WeightBelowMinimum(weight));
    }
    if weight > MAX_WEIGHT {
        return Err(StoreError::WeightAboveMaximum(weight));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(5.0).is_ok());
        assert!(validate_weight(2.5).is_ok());
    }

    #[test]
    fn rejects_below_minimum() {
        match validate_weight(-0.1) {
            Err(StoreError::WeightBelowMinimum(w)) => assert_eq!(w, -0.1),
            other => panic!("expected WeightBelowMinimum, got {:?}", other),
        }
    }

    #[test]
    fn rejects_above_maximum() {
        match validate_weight(5.1) {
            Err(StoreError::WeightAboveMaximum(w)) => assert_eq!(w, 5.1),
            other => panic!("expected WeightAboveMaximum, got {:?}", other),
        }
    }
}
