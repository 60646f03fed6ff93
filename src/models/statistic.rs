use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped rating observation tying a restaurant to a criteria.
/// The sequence of observations for a criteria, in insertion order, is
/// the time series the aggregation engine reduces.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Statistic {
    pub id: String,
    pub restaurant_id: String,
    pub criteria_id: String, // Loose reference; see Database::insert_statistic
    pub rating: f64,
    pub date: DateTime<Utc>, // Assigned once at insert
}
