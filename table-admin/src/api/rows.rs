//! Row editing endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::error_response;
use crate::database::traits::StoreAccessor;
use crate::schema::{AffectedRowsResponse, DeleteRowRequest, UpdateRowRequest};

/// Handler for PUT /api/databases/{database}/tables/{table}/rows
///
/// Request body:
/// ```json
/// {
///   "values": { "name": "Grace" },
///   "filter": [{ "column": "id", "operator": "=", "value": 3 }]
/// }
/// ```
///
/// Response:
/// ```json
/// { "affectedRows": 1 }
/// ```
pub async fn update_row_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path((database, table)): Path<(String, String)>,
    Json(request): Json<UpdateRowRequest>,
) -> Response {
    match accessor
        .update_row(&database, &table, &request.values, &request.filter)
        .await
    {
        Ok(affected_rows) => (StatusCode::OK, Json(AffectedRowsResponse { affected_rows })).into_response(),
        Err(error) => {
            tracing::warn!("Failed to update rows of '{}.{}': {}", database, table, error);
            error_response(error)
        }
    }
}

/// Handler for DELETE /api/databases/{database}/tables/{table}/rows
///
/// Request body:
/// ```json
/// { "filter": [{ "column": "id", "value": 3 }] }
/// ```
pub async fn delete_row_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path((database, table)): Path<(String, String)>,
    Json(request): Json<DeleteRowRequest>,
) -> Response {
    match accessor.delete_row(&database, &table, &request.filter).await {
        Ok(affected_rows) => (StatusCode::OK, Json(AffectedRowsResponse { affected_rows })).into_response(),
        Err(error) => {
            tracing::warn!("Failed to delete rows of '{}.{}': {}", database, table, error);
            error_response(error)
        }
    }
}
