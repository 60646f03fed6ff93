use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::db::Database;
use crate::error::StoreError;
use crate::models::criteria::NewCriteria;
use crate::models::cuisine::CuisineType;
use crate::models::restaurant::{NewRestaurant, Restaurant};
use crate::models::review::NewReview;
use crate::models::user::NewUser;

pub type SharedDb = web::Data<Arc<Mutex<Database>>>;

#[derive(Serialize, Deserialize)]
pub struct StatisticRequest {
    pub restaurant_id: String,
    pub criteria_id: String,
    pub rating: f64,
}

#[derive(Serialize, Deserialize)]
pub struct WeightRequest {
    pub weight: f64,
}

#[derive(Serialize, Deserialize)]
pub struct CuisineRequest {
    pub cuisine_type: CuisineType, // Closed enum; unknown labels fail deserialization
}

// One place to turn store errors into HTTP statuses
fn error_response(err: StoreError) -> HttpResponse {
    if err.is_validation() {
        return HttpResponse::BadRequest().body(err.to_string());
    }
    match err {
        StoreError::NotFound { .. } => HttpResponse::NotFound().body(err.to_string()),
        StoreError::Integrity(_) => HttpResponse::Conflict().body(err.to_string()),
        other => {
            error!("store error: {:?}", other);
            HttpResponse::InternalServerError().body("internal error")
        }
    }
}

// ---- Restaurants ----

pub async fn create_restaurant(db: SharedDb, body: web::Json<NewRestaurant>) -> HttpResponse {
    let db = db.lock().await;
    info!("[API] Creating restaurant '{}'", body.name);
    match db.insert_restaurant(&body).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(err),
    }
}

pub async fn list_restaurants(db: SharedDb) -> HttpResponse {
    let db = db.lock().await;
    match db.list_restaurants().await {
        Ok(restaurants) => {
            info!("[API] Returning {} restaurants", restaurants.len());
            HttpResponse::Ok().json(restaurants)
        }
        Err(err) => error_response(err),
    }
}

pub async fn get_restaurant(db: SharedDb, id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.get_restaurant(&id).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(err),
    }
}

pub async fn update_restaurant(
    db: SharedDb,
    id: web::Path<String>,
    body: web::Json<Restaurant>,
) -> HttpResponse {
    if body.id != *id {
        return HttpResponse::BadRequest().body("restaurant id mismatch");
    }
    let db = db.lock().await;
    match db.update_restaurant(&body).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(err),
    }
}

pub async fn delete_restaurant(db: SharedDb, id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.delete_restaurant(&id).await {
        Ok(()) => HttpResponse::Ok().body("Restaurant deleted"),
        Err(err) => error_response(err),
    }
}

// ---- Reviews ----

pub async fn create_review(
    db: SharedDb,
    restaurant_id: web::Path<String>,
    body: web::Json<NewReview>,
) -> HttpResponse {
    let db = db.lock().await;
    match db.insert_review(&restaurant_id, &body).await {
        Ok(review) => HttpResponse::Ok().json(review),
        Err(err) => error_response(err),
    }
}

pub async fn list_reviews(db: SharedDb, restaurant_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.reviews_for_restaurant(&restaurant_id).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(err) => error_response(err),
    }
}

// ---- Criteria ----

pub async fn create_criteria(
    db: SharedDb,
    restaurant_id: web::Path<String>,
    body: web::Json<NewCriteria>,
) -> HttpResponse {
    let db = db.lock().await;
    match db.insert_criteria(&restaurant_id, &body).await {
        Ok(criteria) => HttpResponse::Ok().json(criteria),
        Err(err) => error_response(err),
    }
}

pub async fn list_criteria(db: SharedDb, restaurant_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.criteria_for_restaurant(&restaurant_id).await {
        Ok(criteria) => HttpResponse::Ok().json(criteria),
        Err(err) => error_response(err),
    }
}

pub async fn update_criteria_weight(
    db: SharedDb,
    id: web::Path<String>,
    body: web::Json<WeightRequest>,
) -> HttpResponse {
    let db = db.lock().await;
    match db.update_criteria_weight(&id, body.weight).await {
        Ok(criteria) => HttpResponse::Ok().json(criteria),
        Err(err) => error_response(err),
    }
}

pub async fn delete_criteria(db: SharedDb, id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.delete_criteria(&id).await {
        Ok(()) => HttpResponse::Ok().body("Criteria deleted"),
        Err(err) => error_response(err),
    }
}

// ---- Statistics & aggregates ----

pub async fn create_statistic(db: SharedDb, body: web::Json<StatisticRequest>) -> HttpResponse {
    let db = db.lock().await;
    info!(
        "[API] Recording rating {} for restaurant {} on criteria {}",
        body.rating, body.restaurant_id, body.criteria_id
    );
    match db
        .insert_statistic(&body.restaurant_id, &body.criteria_id, body.rating)
        .await
    {
        Ok(statistic) => HttpResponse::Ok().json(statistic),
        Err(err) => error_response(err),
    }
}

pub async fn list_statistics(db: SharedDb, criteria_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.statistics_for_criteria(&criteria_id).await {
        Ok(statistics) => HttpResponse::Ok().json(statistics),
        Err(err) => error_response(err),
    }
}

pub async fn average_rating(db: SharedDb, criteria_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.average_rating(&criteria_id).await {
        // 0.0 means "no observations"; use the best/worst endpoints to
        // distinguish an empty series from genuinely zero ratings.
        Ok(average) => HttpResponse::Ok().json(average),
        Err(err) => error_response(err),
    }
}

pub async fn best_restaurant(db: SharedDb, criteria_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.best_restaurant(&criteria_id).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(err),
    }
}

pub async fn worst_restaurant(db: SharedDb, criteria_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.worst_restaurant(&criteria_id).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(err),
    }
}

// ---- Cuisine tags ----

pub async fn add_cuisine(
    db: SharedDb,
    restaurant_id: web::Path<String>,
    body: web::Json<CuisineRequest>,
) -> HttpResponse {
    let db = db.lock().await;
    match db.add_cuisine(&restaurant_id, body.cuisine_type).await {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => error_response(err),
    }
}

pub async fn list_cuisines(db: SharedDb, restaurant_id: web::Path<String>) -> HttpResponse {
    let db = db.lock().await;
    match db.cuisines_for_restaurant(&restaurant_id).await {
        Ok(tags) => HttpResponse::Ok().json(tags),
        Err(err) => error_response(err),
    }
}

// ---- Users ----

pub async fn create_user(db: SharedDb, body: web::Json<NewUser>) -> HttpResponse {
    let db = db.lock().await;
    match db.insert_user(&body).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_response(err),
    }
}

/// Registers every route; shared between the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/restaurants", web::post().to(create_restaurant))
        .route("/restaurants", web::get().to(list_restaurants))
        .route("/restaurants/{id}", web::get().to(get_restaurant))
        .route("/restaurants/{id}", web::put().to(update_restaurant))
        .route("/restaurants/{id}", web::delete().to(delete_restaurant))
        .route("/restaurants/{id}/reviews", web::post().to(create_review))
        .route("/restaurants/{id}/reviews", web::get().to(list_reviews))
        .route("/restaurants/{id}/criteria", web::post().to(create_criteria))
        .route("/restaurants/{id}/criteria", web::get().to(list_criteria))
        .route("/restaurants/{id}/cuisines", web::post().to(add_cuisine))
        .route("/restaurants/{id}/cuisines", web::get().to(list_cuisines))
        .route("/criteria/{id}/weight", web::put().to(update_criteria_weight))
        .route("/criteria/{id}", web::delete().to(delete_criteria))
        .route("/criteria/{id}/statistics", web::get().to(list_statistics))
        .route("/criteria/{id}/average", web::get().to(average_rating))
        .route("/criteria/{id}/best", web::get().to(best_restaurant))
        .route("/criteria/{id}/worst", web::get().to(worst_restaurant))
        .route("/statistics", web::post().to(create_statistic))
        .route("/users", web::post().to(create_user));
}
