//! Table listing, creation, reading and import endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::error_response;
use crate::database::traits::StoreAccessor;
use crate::schema::{CreateTableRequest, ImportRequest, MessageResponse, TablesResponse};

/// Handler for GET /api/databases/{database}/tables
pub async fn list_tables_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path(database): Path<String>,
) -> Response {
    match accessor.list_tables(&database).await {
        Ok(tables) => (StatusCode::OK, Json(TablesResponse { tables })).into_response(),
        Err(error) => {
            tracing::warn!("Failed to list tables of '{}': {}", database, error);
            error_response(error)
        }
    }
}

/// Handler for POST /api/databases/{database}/tables
///
/// Request body:
/// ```json
/// {
///   "name": "people",
///   "columns": [
///     { "name": "id", "type": "INTEGER", "primaryKey": true },
///     { "name": "name", "type": "VARCHAR(100)" }
///   ]
/// }
/// ```
pub async fn create_table_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path(database): Path<String>,
    Json(request): Json<CreateTableRequest>,
) -> Response {
    match accessor
        .create_table(&database, &request.name, &request.columns)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: format!("Table '{}' created successfully!", request.name),
            }),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(
                "Failed to create table '{}' in '{}': {}",
                request.name,
                database,
                error
            );
            error_response(error)
        }
    }
}

/// Handler for GET /api/databases/{database}/tables/{table}
///
/// Returns the columns, primary key and every row of the table.
pub async fn read_table_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path((database, table)): Path<(String, String)>,
) -> Response {
    match accessor.read_table(&database, &table).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(error) => {
            tracing::warn!("Failed to read table '{}.{}': {}", database, table, error);
            error_response(error)
        }
    }
}

/// Handler for POST /api/databases/{database}/tables/{table}/import
///
/// Imports a CSV file from a path readable by the server.
///
/// Request body:
/// ```json
/// { "path": "/data/people.csv" }
/// ```
pub async fn import_csv_handler<DB: StoreAccessor>(
    State(accessor): State<Arc<DB>>,
    Path((database, table)): Path<(String, String)>,
    Json(request): Json<ImportRequest>,
) -> Response {
    match accessor.import_csv(&database, &table, &request.path).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => {
            tracing::warn!(
                "Failed to import '{}' into '{}.{}': {}",
                request.path.display(),
                database,
                table,
                error
            );
            error_response(error)
        }
    }
}
