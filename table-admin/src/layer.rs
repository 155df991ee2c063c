//! AdminLayer - Axum integration of the admin API
//!
//! This module provides the entry point for serving a store accessor over
//! HTTP, standalone or merged into an existing Axum application.

use crate::api::create_api_router;
use crate::database::traits::StoreAccessor;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteAccessor;

#[cfg(feature = "mysql")]
use crate::database::mysql::MySqlAccessor;

/// Admin API for one store accessor
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use table_admin::AdminLayer;
///
/// # async fn example() -> Result<(), table_admin::AccessorError> {
/// let admin = AdminLayer::mysql("/admin", "localhost", "root", "secret").await?;
/// let app = Router::new().merge(admin.into_router());
/// # Ok(())
/// # }
/// ```
pub struct AdminLayer<DB: StoreAccessor> {
    base_path: String,
    accessor: Arc<DB>,
}

impl<DB: StoreAccessor> AdminLayer<DB> {
    /// Create a new admin API at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path the API is mounted under (e.g., "/admin")
    /// * `accessor` - The store accessor implementation
    pub fn new(base_path: impl Into<String>, accessor: DB) -> Self {
        Self {
            base_path: base_path.into(),
            accessor: Arc::new(accessor),
        }
    }

    /// Shared handle to the accessor
    pub fn accessor(&self) -> Arc<DB> {
        self.accessor.clone()
    }

    /// Convert into an Axum Router that can be served or merged
    ///
    /// Endpoints live at `{base_path}/api/*`, with permissive CORS and
    /// request tracing applied.
    pub fn into_router(self) -> Router {
        let api_router = create_api_router(self.accessor);
        let base_path = self.base_path.trim_end_matches('/');

        Router::new()
            .nest(&format!("{}/api", base_path), api_router)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "sqlite")]
impl AdminLayer<SqliteAccessor> {
    /// Create an admin API over a SQLite data directory
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path the API is mounted under
    /// * `directory` - Directory holding one `.db` file per database
    pub async fn sqlite(
        base_path: impl Into<String>,
        directory: impl Into<std::path::PathBuf>,
    ) -> Result<Self, crate::AccessorError> {
        Ok(Self::new(base_path, SqliteAccessor::connect(directory).await?))
    }
}

#[cfg(feature = "mysql")]
impl AdminLayer<MySqlAccessor> {
    /// Create an admin API over a MySQL server
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path the API is mounted under
    /// * `host` - Server host, optionally with `:port`
    /// * `user` - User name
    /// * `password` - Password
    pub async fn mysql(
        base_path: impl Into<String>,
        host: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, crate::AccessorError> {
        Ok(Self::new(base_path, MySqlAccessor::connect(host, user, password).await?))
    }
}
