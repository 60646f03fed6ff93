pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod stats;
