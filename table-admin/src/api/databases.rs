//! Database listing and creation endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::error_response;
use crate::database::traits::StoreAccessor;
use crate::schema::{CreateDatabaseRequest, DatabasesResponse, MessageResponse};

/// Handler for GET /api/databases
///
/// Returns every database visible to the session.
pub async fn list_databases_handler<DB: StoreAccessor>(State(accessor): State<Arc<DB>>) -> Response {
    match accessor.list_databases().await {
        Ok(databases) => (StatusCode::OK, Json(DatabasesResponse { databases })).into_response(),
        Err(error) => {
            tracing::warn!("Failed to list databases: {}", error);
            error_response(error)
        }
    }
}

/// Handler for POST /api/databases
///
/// Request body:
/// ```json
/// { "name": "inventory" }
/// ```
pub async fn create_database_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Response {
    match accessor.create_database(&request.name).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: format!("Database '{}' created successfully!", request.name),
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("Failed to create database '{}': {}", request.name, error);
            error_response(error)
        }
    }
}
