use actix_web::{web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use micheline::api;
use micheline::db::Database;

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Welcome to Micheline!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // Initialize the database
    let db_path = std::env::var("MICHELINE_DB").unwrap_or_else(|_| "micheline.db".to_string());
    let db = Database::new(&db_path).map_err(std::io::Error::other)?;
    db.create_schema().await.map_err(std::io::Error::other)?;
    let db = Arc::new(Mutex::new(db)); // Shared state across workers

    let addr = std::env::var("MICHELINE_ADDR").unwrap_or_else(|_| "127.0.0.1:3004".to_string());
    info!("listening on http://{}", addr);

    HttpServer::new(move || {
        let db = db.clone();

        App::new()
            .app_data(web::Data::new(db))
            .route("/", web::get().to(index))
            .configure(api::configure)
    })
    .bind(&addr)?
    .run()
    .await
}
