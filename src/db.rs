use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::criteria::{self, Criteria, NewCriteria};
use crate::models::cuisine::{CuisineType, RestaurantCuisine};
use crate::models::restaurant::{NewRestaurant, Restaurant};
use crate::models::review::{NewReview, Review};
use crate::models::statistic::Statistic;
use crate::models::user::{NewUser, User};
use crate::{auth, stats};


/// Handle on the SQLite store. All access funnels through one
/// connection behind a tokio mutex.
#[derive(Debug)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn restaurant_from_row(row: &Row<'_>) -> rusqlite::Result<Restaurant> {
    Ok(Restaurant {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zip_code: row.get(5)?,
        website: row.get(6)?,
        cuisine_type: row.get(7)?,
        rating: row.get(8)?,
        price_range: row.get(9)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        user_name: row.get(2)?,
        review_text: row.get(3)?,
        rating: row.get(4)?,
        date_posted: parse_timestamp(5, row.get(5)?)?,
    })
}

fn criteria_from_row(row: &Row<'_>) -> rusqlite::Result<Criteria> {
    Ok(Criteria {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        name: row.get(2)?,
        comment: row.get(3)?,
        weight: row.get(4)?,
    })
}

fn statistic_from_row(row: &Row<'_>) -> rusqlite::Result<Statistic> {
    Ok(Statistic {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        criteria_id: row.get(2)?,
        rating: row.get(3)?,
        date: parse_timestamp(4, row.get(4)?)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_admin: row.get(4)?,
        is_active: row.get(5)?,
        date_joined: parse_timestamp(6, row.get(6)?)?,
    })
}

/// Maps SQLite constraint failures (unique username/email, dangling FK)
/// to the integrity error kind; everything else passes through.
fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(inner, message)
            if inner.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Integrity(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            )
        }
        _ => StoreError::Sqlite(err),
    }
}

impl Database {
    // Create a new database connection
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        // Declared ON DELETE CASCADE clauses only fire with this pragma on
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        info!("Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Create the database schema
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;

        // 1. Restaurants table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS restaurants (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT NOT NULL,
                website TEXT,
                cuisine_type TEXT NOT NULL,
                rating REAL,
                price_range TEXT
            );",
        )?;

        // 2. Reviews table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                user_name TEXT NOT NULL,
                review_text TEXT NOT NULL,
                rating REAL NOT NULL,
                date_posted TEXT NOT NULL,
                FOREIGN KEY (restaurant_id) REFERENCES restaurants(id) ON DELETE CASCADE
            );",
        )?;

        // 3. Criteria table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS criteria (
                id TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                comment TEXT NOT NULL,
                weight REAL NOT NULL,
                FOREIGN KEY (restaurant_id) REFERENCES restaurants(id) ON DELETE CASCADE
            );",
        )?;

        // 4. Statistics table (the rating time series)
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS statistics (
                id TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                criteria_id TEXT NOT NULL,
                rating REAL NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY (restaurant_id) REFERENCES restaurants(id) ON DELETE CASCADE,
                FOREIGN KEY (criteria_id) REFERENCES criteria(id) ON DELETE CASCADE
            );",
        )?;

        // 5. Users table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                date_joined TEXT NOT NULL
            );",
        )?;

        // 6. Cuisine tags table
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS restaurant_cuisines (
                id TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                cuisine_type TEXT NOT NULL,
                FOREIGN KEY (restaurant_id) REFERENCES restaurants(id) ON DELETE CASCADE
            );",
        )?;

        info!("Database schema created");
        Ok(())
    }

    // ---- Restaurants ----

    pub async fn insert_restaurant(
        &self,
        new: &NewRestaurant,
    ) -> Result<Restaurant, StoreError> {
        let conn = self.conn.lock().await;
        let restaurant = Restaurant {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            address: new.address.clone(),
            city: new.city.clone(),
            state: new.state.clone(),
            zip_code: new.zip_code.clone(),
            website: new.website.clone(),
            cuisine_type: new.cuisine_type.clone(),
            rating: new.rating,
            price_range: new.price_range.clone(),
        };
        conn.execute(
            "INSERT INTO restaurants (id, name, address, city, state, zip_code, website, cuisine_type, rating, price_range)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                restaurant.id,
                restaurant.name,
                restaurant.address,
                restaurant.city,
                restaurant.state,
                restaurant.zip_code,
                restaurant.website,
                restaurant.cuisine_type,
                restaurant.rating,
                restaurant.price_range,
            ],
        )
        .map_err(map_sqlite_error)?;
        info!("Restaurant inserted: {} ({})", restaurant.name, restaurant.id);
        Ok(restaurant)
    }

    pub async fn get_restaurant(&self, id: &str) -> Result<Restaurant, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, name, address, city, state, zip_code, website, cuisine_type, rating, price_range
             FROM restaurants WHERE id = ?",
            [id],
            restaurant_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("restaurant", id),
            other => StoreError::Sqlite(other),
        })
    }

    // Retrieve all restaurants, oldest first
    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, address, city, state, zip_code, website, cuisine_type, rating, price_range
             FROM restaurants ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], restaurant_from_row)?;
        let mut restaurants = Vec::new();
        for row in rows {
            restaurants.push(row?);
        }
        info!("Fetched {} restaurants", restaurants.len());
        Ok(restaurants)
    }

    pub async fn update_restaurant(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Restaurant, StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(
                "UPDATE restaurants
                 SET name = ?, address = ?, city = ?, state = ?, zip_code = ?,
                     website = ?, cuisine_type = ?, rating = ?, price_range = ?
                 WHERE id = ?",
                rusqlite::params![
                    restaurant.name,
                    restaurant.address,
                    restaurant.city,
                    restaurant.state,
                    restaurant.zip_code,
                    restaurant.website,
                    restaurant.cuisine_type,
                    restaurant.rating,
                    restaurant.price_range,
                    restaurant.id,
                ],
            )
            .map_err(map_sqlite_error)?;
        if changed == 0 {
            return Err(StoreError::not_found("restaurant", &restaurant.id));
        }
        info!("Restaurant updated: {}", restaurant.id);
        Ok(restaurant.clone())
    }

    // Deleting a restaurant cascades to its reviews, criteria,
    // statistics and cuisine tags.
    pub async fn delete_restaurant(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM restaurants WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(StoreError::not_found("restaurant", id));
        }
        info!("Restaurant deleted: {}", id);
        Ok(())
    }

    // ---- Reviews ----

    pub async fn insert_review(
        &self,
        restaurant_id: &str,
        new: &NewReview,
    ) -> Result<Review, StoreError> {
        let conn = self.conn.lock().await;
        // Surface a clean NotFound instead of the FK failure
        ensure_exists(&conn, "restaurants", "restaurant", restaurant_id)?;

        let review = Review {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            user_name: new.user_name.clone(),
            review_text: new.review_text.clone(),
            rating: new.rating,
            date_posted: Utc::now(),
        };
        conn.execute(
            "INSERT INTO reviews (id, restaurant_id, user_name, review_text, rating, date_posted)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                review.id,
                review.restaurant_id,
                review.user_name,
                review.review_text,
                review.rating,
                review.date_posted.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_error)?;
        info!("Review inserted for restaurant {}", restaurant_id);
        Ok(review)
    }

    pub async fn reviews_for_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<Review>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, restaurant_id, user_name, review_text, rating, date_posted
             FROM reviews WHERE restaurant_id = ? ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([restaurant_id], review_from_row)?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }

    // ---- Criteria ----

    pub async fn insert_criteria(
        &self,
        restaurant_id: &str,
        new: &NewCriteria,
    ) -> Result<Criteria, StoreError> {
        // Validate before any SQL runs so a rejection changes nothing
        criteria::validate_weight(new.weight)?;

        let conn = self.conn.lock().await;
        ensure_exists(&conn, "restaurants", "restaurant", restaurant_id)?;

        let criteria = Criteria {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            name: new.name.clone(),
            comment: new.comment.clone(),
            weight: new.weight,
        };
        conn.execute(
            "INSERT INTO criteria (id, restaurant_id, name, comment, weight)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                criteria.id,
                criteria.restaurant_id,
                criteria.name,
                criteria.comment,
                criteria.weight,
            ],
        )
        .map_err(map_sqlite_error)?;
        info!(
            "Criteria '{}' (weight {}) inserted for restaurant {}",
            criteria.name, criteria.weight, restaurant_id
        );
        Ok(criteria)
    }

    pub async fn get_criteria(&self, id: &str) -> Result<Criteria, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, restaurant_id, name, comment, weight FROM criteria WHERE id = ?",
            [id],
            criteria_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("criteria", id),
            other => StoreError::Sqlite(other),
        })
    }

    pub async fn criteria_for_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<Criteria>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, restaurant_id, name, comment, weight
             FROM criteria WHERE restaurant_id = ? ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([restaurant_id], criteria_from_row)?;
        let mut criteria = Vec::new();
        for row in rows {
            criteria.push(row?);
        }
        Ok(criteria)
    }

    pub async fn update_criteria_weight(
        &self,
        id: &str,
        weight: f64,
    ) -> Result<Criteria, StoreError> {
        criteria::validate_weight(weight)?;

        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE criteria SET weight = ? WHERE id = ?",
            rusqlite::params![weight, id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("criteria", id));
        }
        info!("Criteria {} weight set to {}", id, weight);
        conn.query_row(
            "SELECT id, restaurant_id, name, comment, weight FROM criteria WHERE id = ?",
            [id],
            criteria_from_row,
        )
        .map_err(StoreError::Sqlite)
    }

    // Deleting a criteria cascades to its statistics.
    pub async fn delete_criteria(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM criteria WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(StoreError::not_found("criteria", id));
        }
        info!("Criteria deleted: {}", id);
        Ok(())
    }

    // ---- Statistics ----

    /// Records one rating observation for a restaurant against a criteria.
    ///
    /// The criteria is not required to belong to the restaurant: the
    /// best/worst-per-criterion aggregates compare observations from
    /// different restaurants under one criterion, so the reference is
    /// deliberately loose.
    pub async fn insert_statistic(
        &self,
        restaurant_id: &str,
        criteria_id: &str,
        rating: f64,
    ) -> Result<Statistic, StoreError> {
        let conn = self.conn.lock().await;
        ensure_exists(&conn, "restaurants", "restaurant", restaurant_id)?;
        ensure_exists(&conn, "criteria", "criteria", criteria_id)?;

        let statistic = Statistic {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            criteria_id: criteria_id.to_string(),
            rating,
            date: Utc::now(),
        };
        conn.execute(
            "INSERT INTO statistics (id, restaurant_id, criteria_id, rating, date)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                statistic.id,
                statistic.restaurant_id,
                statistic.criteria_id,
                statistic.rating,
                statistic.date.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_error)?;
        info!(
            "Statistic recorded: restaurant {} criteria {} rating {}",
            restaurant_id, criteria_id, rating
        );
        Ok(statistic)
    }

    pub async fn get_statistic(&self, id: &str) -> Result<Statistic, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, restaurant_id, criteria_id, rating, date FROM statistics WHERE id = ?",
            [id],
            statistic_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("statistic", id),
            other => StoreError::Sqlite(other),
        })
    }

    /// The observation time series for a criteria, in insertion order.
    /// Insertion order is what the tie-break in the aggregates relies on.
    pub async fn statistics_for_criteria(
        &self,
        criteria_id: &str,
    ) -> Result<Vec<Statistic>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, restaurant_id, criteria_id, rating, date
             FROM statistics WHERE criteria_id = ? ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([criteria_id], statistic_from_row)?;
        let mut statistics = Vec::new();
        for row in rows {
            statistics.push(row?);
        }
        Ok(statistics)
    }

    // ---- Aggregates ----
    // Pure reads, recomputed on every call; the reductions live in stats.rs.

    /// Mean rating for a criteria; 0.0 means "no observations", not a
    /// real floor rating.
    pub async fn average_rating(&self, criteria_id: &str) -> Result<f64, StoreError> {
        let observations = self.statistics_for_criteria(criteria_id).await?;
        Ok(stats::average_rating(&observations))
    }

    pub async fn best_restaurant(
        &self,
        criteria_id: &str,
    ) -> Result<Option<Restaurant>, StoreError> {
        let observations = self.statistics_for_criteria(criteria_id).await?;
        match stats::best_observation(&observations) {
            Some(obs) => {
                let restaurant_id = obs.restaurant_id.clone();
                Ok(Some(self.get_restaurant(&restaurant_id).await?))
            }
            None => Ok(None),
        }
    }

    pub async fn worst_restaurant(
        &self,
        criteria_id: &str,
    ) -> Result<Option<Restaurant>, StoreError> {
        let observations = self.statistics_for_criteria(criteria_id).await?;
        match stats::worst_observation(&observations) {
            Some(obs) => {
                let restaurant_id = obs.restaurant_id.clone();
                Ok(Some(self.get_restaurant(&restaurant_id).await?))
            }
            None => Ok(None),
        }
    }

    // ---- Users ----

    pub async fn insert_user(&self, new: &NewUser) -> Result<User, StoreError> {
        // Hash outside the lock; argon2 is deliberately slow
        let password_hash = auth::hash_password(&new.password)?;

        let conn = self.conn.lock().await;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash,
            is_admin: new.is_admin,
            is_active: true,
            date_joined: Utc::now(),
        };
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, is_admin, is_active, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                user.is_admin,
                user.is_active,
                user.date_joined.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_error)?;
        info!("User created: {}", user.username);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, username, email, password_hash, is_admin, is_active, date_joined
             FROM users WHERE id = ?",
            [id],
            user_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("user", id),
            other => StoreError::Sqlite(other),
        })
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, username, email, password_hash, is_admin, is_active, date_joined
             FROM users WHERE username = ?",
            [username],
            user_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("user", username),
            other => StoreError::Sqlite(other),
        })
    }

    // ---- Cuisine tags ----

    pub async fn add_cuisine(
        &self,
        restaurant_id: &str,
        cuisine: CuisineType,
    ) -> Result<RestaurantCuisine, StoreError> {
        let conn = self.conn.lock().await;
        ensure_exists(&conn, "restaurants", "restaurant", restaurant_id)?;

        let tag = RestaurantCuisine {
            id: Uuid::new_v4().to_string(),
            restaurant_id: restaurant_id.to_string(),
            cuisine_type: cuisine,
        };
        conn.execute(
            "INSERT INTO restaurant_cuisines (id, restaurant_id, cuisine_type) VALUES (?, ?, ?)",
            rusqlite::params![tag.id, tag.restaurant_id, cuisine.label()],
        )
        .map_err(map_sqlite_error)?;
        info!("Cuisine '{}' tagged on restaurant {}", cuisine.label(), restaurant_id);
        Ok(tag)
    }

    pub async fn cuisines_for_restaurant(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<RestaurantCuisine>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, restaurant_id, cuisine_type
             FROM restaurant_cuisines WHERE restaurant_id = ? ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([restaurant_id], |row| {
            let label: String = row.get(2)?;
            let cuisine = CuisineType::from_label(&label).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    Type::Text,
                    format!("unknown cuisine label: {label}").into(),
                )
            })?;
            Ok(RestaurantCuisine {
                id: row.get(0)?,
                restaurant_id: row.get(1)?,
                cuisine_type: cuisine,
            })
        })?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }
}

// Existence probe used before inserts that reference a parent row, so
// callers see NotFound rather than a raw foreign-key failure.
fn ensure_exists(
    conn: &Connection,
    table: &str,
    entity: &'static str,
    id: &str,
) -> Result<(), StoreError> {
    let query = format!("SELECT 1 FROM {table} WHERE id = ?");
    match conn.query_row(&query, [id], |_| Ok(())) {
        Ok(()) => Ok(()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::not_found(entity, id)),
        Err(e) => Err(StoreError::Sqlite(e)),
    }
}
