use thiserror::Error;

/// Everything a store operation can fail with. Nothing here retries;
/// failures surface synchronously to the immediate caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("weight {0} is below the minimum of 0")]
    WeightBelowMinimum(f64),

    #[error("weight {0} is above the maximum of 5")]
    WeightAboveMaximum(f64),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("password hashing failed")]
    Hashing,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for the two weight-bound violations.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::WeightBelowMinimum(_) | StoreError::WeightAboveMaximum(_)
        )
    }
}
