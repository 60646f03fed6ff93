use serde::{Deserialize, Serialize};

/// Closed vocabulary of cuisine labels. Anything outside this set is
/// rejected where user input is accepted (serde or `from_label`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuisineType {
    #[serde(rename = "Français")]
    French,
    #[serde(rename = "Italien")]
    Italian,
    #[serde(rename = "Chinois")]
    Chinese,
    #[serde(rename = "Japonais")]
    Japanese,
    #[serde(rename = "Indien")]
    Indian,
    #[serde(rename = "Mexicain")]
    Mexican,
    #[serde(rename = "Thai")]
    Thai,
    #[serde(rename = "Américain")]
    American,
}

impl CuisineType {
    pub fn label(&self) -> &'static str {
        match self {
            CuisineType::French => "Français",
            CuisineType::Italian => "Italien",
            CuisineType::Chinese => "Chinois",
            CuisineType::Japanese => "Japonais",
            CuisineType::Indian => "Indien",
            CuisineType::Mexican => "Mexicain",
            CuisineType::Thai => "Thai",
            CuisineType::American => "Américain",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Français" => Some(CuisineType::French),
            "Italien" => Some(CuisineType::Italian),
            "Chinois" => Some(CuisineType::Chinese),
            "Japonais" => Some(CuisineType::Japanese),
            "Indien" => Some(CuisineType::Indian),
            "Mexicain" => Some(CuisineType::Mexican),
            "Thai" => Some(CuisineType::Thai),
            "Américain" => Some(CuisineType::American),
            _ => None,
        }
    }
}

/// One cuisine tag on a restaurant; a restaurant may hold several.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestaurantCuisine {
    pub id: String,
    pub restaurant_id: String,
    pub cuisine_type: CuisineType,
}
