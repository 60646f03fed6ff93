use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Restaurant {
    pub id: String,                 // Unique ID for the restaurant
    pub name: String,               // Restaurant name (not unique)
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub website: Option<String>,
    pub cuisine_type: String,       // Free-form label; tags carry the closed vocabulary
    pub rating: Option<f64>,        // Overall average rating, if known
    pub price_range: Option<String>,
}

/// Fields supplied by the caller when creating a restaurant; the id is
/// assigned by the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub website: Option<String>,
    pub cuisine_type: String,
    pub rating: Option<f64>,
    pub price_range: Option<String>,
}
