use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use std::sync::Arc;
use tokio::sync::Mutex;

use micheline::api;
use micheline::db::Database;
use micheline::models::criteria::{Criteria, NewCriteria};
use micheline::models::restaurant::{NewRestaurant, Restaurant};
use micheline::models::statistic::Statistic;
use micheline::models::user::{NewUser, User};

async fn test_db() -> Arc<Mutex<Database>> {
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();
    Arc::new(Mutex::new(db))
}

fn restaurant_payload(name: &str) -> NewRestaurant {
    NewRestaurant {
        name: name.into(),
        address: "3 place Bellecour".into(),
        city: "Lyon".into(),
        state: "Rhône".into(),
        zip_code: "69002".into(),
        website: None,
        cuisine_type: "Bouchon".into(),
        rating: None,
        price_range: None,
    }
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .configure(api::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn restaurant_crud_over_http() {
    let db = test_db().await;
    let app = app!(db);

    // Create
    let req = test::TestRequest::post()
        .uri("/restaurants")
        .set_json(restaurant_payload("Chez Paul"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let restaurant: Restaurant = test::read_body_json(resp).await;
    assert_eq!(restaurant.name, "Chez Paul");

    // Fetch it back
    let req = test::TestRequest::get()
        .uri(&format!("/restaurants/{}", restaurant.id))
        .to_request();
    let fetched: Restaurant = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(fetched.city, "Lyon");

    // Missing id is a 404
    let req = test::TestRequest::get().uri("/restaurants/nope").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    // Delete, then the lookup 404s
    let req = test::TestRequest::delete()
        .uri(&format!("/restaurants/{}", restaurant.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get()
        .uri(&format!("/restaurants/{}", restaurant.id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn criteria_weight_validation_over_http() {
    let db = test_db().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/restaurants")
        .set_json(restaurant_payload("Chez Paul"))
        .to_request();
    let restaurant: Restaurant = test::read_body_json(test::call_service(&app, req).await).await;

    // Weight outside [0, 5] is a 400
    let req = test::TestRequest::post()
        .uri(&format!("/restaurants/{}/criteria", restaurant.id))
        .set_json(NewCriteria {
            name: "Terrasse".into(),
            comment: String::new(),
            weight: 6.0,
        })
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // Nothing was persisted by the rejected write
    let req = test::TestRequest::get()
        .uri(&format!("/restaurants/{}/criteria", restaurant.id))
        .to_request();
    let criteria: Vec<Criteria> = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(criteria.is_empty());

    // Boundary weight is accepted and round-trips
    let req = test::TestRequest::post()
        .uri(&format!("/restaurants/{}/criteria", restaurant.id))
        .set_json(NewCriteria {
            name: "Terrasse".into(),
            comment: "Plein sud".into(),
            weight: 5.0,
        })
        .to_request();
    let created: Criteria = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(created.weight, 5.0);

    // Invalid weight update is a 400 and leaves the stored value alone
    let req = test::TestRequest::put()
        .uri(&format!("/criteria/{}/weight", created.id))
        .set_json(api::WeightRequest { weight: -1.0 })
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
    let req = test::TestRequest::get()
        .uri(&format!("/restaurants/{}/criteria", restaurant.id))
        .to_request();
    let criteria: Vec<Criteria> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(criteria[0].weight, 5.0);
}

#[actix_web::test]
async fn aggregates_over_http() {
    let db = test_db().await;
    let app = app!(db);

    let mut ids = Vec::new();
    for name in ["Un", "Deux", "Trois"] {
        let req = test::TestRequest::post()
            .uri("/restaurants")
            .set_json(restaurant_payload(name))
            .to_request();
        let restaurant: Restaurant =
            test::read_body_json(test::call_service(&app, req).await).await;
        ids.push(restaurant.id);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/restaurants/{}/criteria", ids[0]))
        .set_json(NewCriteria {
            name: "Rapport qualité/prix".into(),
            comment: String::new(),
            weight: 5.0,
        })
        .to_request();
    let criteria: Criteria = test::read_body_json(test::call_service(&app, req).await).await;

    // Empty series: sentinel average, null best/worst
    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/average", criteria.id))
        .to_request();
    let average: f64 = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(average, 0.0);
    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/best", criteria.id))
        .to_request();
    let best: Option<Restaurant> = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(best.is_none());

    for (restaurant_id, rating) in [(&ids[0], 3.0), (&ids[1], 5.0), (&ids[2], 1.0)] {
        let req = test::TestRequest::post()
            .uri("/statistics")
            .set_json(api::StatisticRequest {
                restaurant_id: restaurant_id.clone(),
                criteria_id: criteria.id.clone(),
                rating,
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/statistics", criteria.id))
        .to_request();
    let series: Vec<Statistic> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(series.len(), 3);

    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/average", criteria.id))
        .to_request();
    let average: f64 = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(average, 3.0);

    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/best", criteria.id))
        .to_request();
    let best: Option<Restaurant> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(best.unwrap().id, ids[1]);

    let req = test::TestRequest::get()
        .uri(&format!("/criteria/{}/worst", criteria.id))
        .to_request();
    let worst: Option<Restaurant> = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(worst.unwrap().id, ids[2]);
}

#[actix_web::test]
async fn cuisine_labels_are_a_closed_set() {
    let db = test_db().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/restaurants")
        .set_json(restaurant_payload("Chez Paul"))
        .to_request();
    let restaurant: Restaurant = test::read_body_json(test::call_service(&app, req).await).await;

    // A label from the vocabulary is accepted
    let req = test::TestRequest::post()
        .uri(&format!("/restaurants/{}/cuisines", restaurant.id))
        .set_json(serde_json::json!({ "cuisine_type": "Japonais" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Anything else is rejected before it reaches the store
    let req = test::TestRequest::post()
        .uri(&format!("/restaurants/{}/cuisines", restaurant.id))
        .set_json(serde_json::json!({ "cuisine_type": "Grec" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn duplicate_user_is_a_conflict() {
    let db = test_db().await;
    let app = app!(db);

    let payload = NewUser {
        username: "camille".into(),
        email: "camille@example.fr".into(),
        password: "mot-de-passe".into(),
        is_admin: false,
    };

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = test::read_body_json(resp).await;
    // The hash never leaves the server
    assert!(user.password_hash.is_empty());

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&payload)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );
}
