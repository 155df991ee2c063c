//! Store accessor trait
//!
//! This trait defines the operations every backend must provide.

use crate::schema::{ColumnDefinition, ColumnValues, ImportSummary, RowFilter, TableData};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Store accessor trait for schema administration and row editing
///
/// Every table-scoped operation names its database explicitly; an accessor
/// keeps no "current database" between calls.
#[async_trait]
pub trait StoreAccessor: Send + Sync + 'static {
    /// Create a new, empty database
    ///
    /// Fails with [`AccessorError::Query`] if the database already exists.
    async fn create_database(&self, name: &str) -> Result<(), AccessorError>;

    /// List every database visible to this session, ordered by name
    async fn list_databases(&self) -> Result<Vec<String>, AccessorError>;

    /// List the tables of a database, ordered by name
    async fn list_tables(&self, database: &str) -> Result<Vec<String>, AccessorError>;

    /// Read a whole table into memory
    ///
    /// No pagination is applied. Column information comes from the schema, so
    /// an empty table still reports its columns in declared order.
    async fn read_table(&self, database: &str, table: &str) -> Result<TableData, AccessorError>;

    /// Create a table with the given columns
    async fn create_table(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDefinition],
    ) -> Result<(), AccessorError>;

    /// Import a CSV file into a table
    ///
    /// The table is created when absent, with every column typed
    /// `VARCHAR(255)`. All rows are inserted in one transaction: either every
    /// record is kept or none is. A table created by a failed import remains.
    async fn import_csv(
        &self,
        database: &str,
        table: &str,
        source: &Path,
    ) -> Result<ImportSummary, AccessorError>;

    /// Set `values` on the rows matching `filter`
    ///
    /// # Returns
    ///
    /// Number of rows affected
    async fn update_row(
        &self,
        database: &str,
        table: &str,
        values: &ColumnValues,
        filter: &RowFilter,
    ) -> Result<u64, AccessorError>;

    /// Delete the rows matching `filter`
    ///
    /// # Returns
    ///
    /// Number of rows deleted
    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        filter: &RowFilter,
    ) -> Result<u64, AccessorError>;

    /// Close every connection held by this accessor
    async fn close(&self);
}

/// Accessor error type
#[derive(Debug, Error)]
pub enum AccessorError {
    /// Could not reach or authenticate with the server
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed or conflicting statement
    #[error("Query error: {0}")]
    Query(String),

    /// Unreadable CSV file or failed import batch
    #[error("Import error: {0}")]
    Import(String),

    /// Database or table does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for AccessorError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            // The session is gone, not the statement at fault
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AccessorError::Connection(error.to_string()),
            _ => AccessorError::Query(error.to_string()),
        }
    }
}

impl From<csv::Error> for AccessorError {
    fn from(error: csv::Error) -> Self {
        AccessorError::Import(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_faults_are_connection_errors() {
        assert!(matches!(
            AccessorError::from(sqlx::Error::PoolClosed),
            AccessorError::Connection(_)
        ));
        assert!(matches!(
            AccessorError::from(sqlx::Error::PoolTimedOut),
            AccessorError::Connection(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(AccessorError::from(sqlx::Error::Io(io)), AccessorError::Connection(_)));
    }

    #[test]
    fn test_statement_faults_are_query_errors() {
        assert!(matches!(
            AccessorError::from(sqlx::Error::RowNotFound),
            AccessorError::Query(_)
        ));
        assert!(matches!(
            AccessorError::from(sqlx::Error::Protocol("unexpected packet".into())),
            AccessorError::Query(_)
        ));
    }
}
