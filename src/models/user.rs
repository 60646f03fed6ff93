use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account that can rate restaurants and add criteria. Reviews are
/// deliberately not linked to users; they carry a free-form name instead.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String, // Unique
    pub email: String,    // Unique
    #[serde(skip_serializing, default)]
    pub password_hash: String, // Argon2id PHC string, never the plaintext
    pub is_admin: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String, // Plaintext on the way in; hashed before storage
    #[serde(default)]
    pub is_admin: bool,
}
