use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Review {
    pub id: String,
    pub restaurant_id: String,       // Restaurant the review belongs to
    pub user_name: String,           // Free-form reviewer name, not a User reference
    pub review_text: String,
    pub rating: f64,                 // 0-5 scale implied, not enforced
    pub date_posted: DateTime<Utc>,  // Assigned once at insert
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewReview {
    pub user_name: String,
    pub review_text: String,
    pub rating: f64,
}
