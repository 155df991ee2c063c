//! REST API endpoints
//!
//! This module contains all API endpoint handlers for the admin surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::database::traits::{AccessorError, StoreAccessor};

pub mod databases;
pub mod rows;
pub mod tables;

// Re-export handlers for convenience
pub use databases::{create_database_handler, list_databases_handler};
pub use rows::{delete_row_handler, update_row_handler};
pub use tables::{create_table_handler, import_csv_handler, list_tables_handler, read_table_handler};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `accessor` - Arc-wrapped store accessor implementation
///
/// # Returns
///
/// An Axum Router configured with all API routes
pub fn create_api_router<DB: StoreAccessor>(accessor: Arc<DB>) -> Router {
    Router::new()
        .route(
            "/databases",
            get(list_databases_handler::<DB>).post(create_database_handler::<DB>),
        )
        .route(
            "/databases/{database}/tables",
            get(list_tables_handler::<DB>).post(create_table_handler::<DB>),
        )
        .route("/databases/{database}/tables/{table}", get(read_table_handler::<DB>))
        .route(
            "/databases/{database}/tables/{table}/import",
            post(import_csv_handler::<DB>),
        )
        .route(
            "/databases/{database}/tables/{table}/rows",
            put(update_row_handler::<DB>).delete(delete_row_handler::<DB>),
        )
        .with_state(accessor)
}

/// Status code for an accessor error
pub fn error_status(error: &AccessorError) -> StatusCode {
    match error {
        AccessorError::Validation(_) | AccessorError::Query(_) => StatusCode::BAD_REQUEST,
        AccessorError::NotFound(_) => StatusCode::NOT_FOUND,
        AccessorError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AccessorError::Connection(_) => StatusCode::BAD_GATEWAY,
    }
}

/// JSON error body `{ "error": message }` with the matching status code
///
/// The driver's message is relayed as-is: this surface is a trusted local tool.
pub fn error_response(error: AccessorError) -> Response {
    (
        error_status(&error),
        Json(serde_json::json!({
            "error": error.to_string()
        })),
    )
        .into_response()
}
