//! # countries-api
//!
//! Read-only JSON API over a `country` table: paginated listing, name search,
//! continent filter, lookup by name, and aggregate counts.
//!
//! ```rust,no_run
//! use sqlx::sqlite::SqlitePool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePool::connect("sqlite:./data/world.db?mode=rwc").await?;
//! countries_api::database::setup(&pool).await?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, countries_api::router(pool)).await?;
//! # Ok(())
//! # }
//! ```

use axum::{routing::get, Router};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;

pub use config::Config;
pub use error::ApiError;

#[derive(Clone)]
pub struct ApplicationState {
    pub pool: SqlitePool,
}

/// Build the application router over a pool whose `country` table exists
pub fn router(pool: SqlitePool) -> Router {
    let state = ApplicationState { pool };

    Router::new()
        .route("/api/countries", get(handlers::list_countries_handler))
        .route("/api/countries/search", get(handlers::search_countries_handler))
        .route(
            "/api/countries/continent/{continent}",
            get(handlers::continent_countries_handler),
        )
        .route("/api/countries/{country_name}", get(handlers::country_handler))
        .route("/api/continents", get(handlers::continents_handler))
        .route("/api/stats", get(handlers::stats_handler))
        .route("/api/health", get(handlers::health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
