//! # table-admin
//!
//! Ad-hoc relational database administration: connect to a server, list
//! databases and tables, create them, import CSV files, and edit or delete
//! rows of tables whose schema is only known at runtime.
//!
//! ## Features
//!
//! - Schema discovery for MySQL servers and SQLite data directories
//! - Full-table reads with column and primary key information
//! - CSV import into new or existing tables, all rows in one transaction
//! - Row updates and deletes addressed by a structured [`RowFilter`]
//! - An Axum router exposing all of the above over HTTP
//!
//! Identifiers are checked against an allow-list and quoted; values are
//! always bound as statement parameters.
//!
//! ## Security Warning
//!
//! **This is a local administration tool!**
//!
//! - No authentication/authorization built-in
//! - Exposes and modifies full database contents
//! - Error responses relay driver messages verbatim
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use table_admin::{SqliteAccessor, StoreAccessor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), table_admin::AccessorError> {
//!     let accessor = SqliteAccessor::connect("./data").await?;
//!     let table = accessor.read_table("inventory", "products").await?;
//!
//!     if let Some(filter) = table.row_filter(0) {
//!         accessor.delete_row("inventory", "products", &filter).await?;
//!     }
//!     Ok(())
//! }
//! ```

// Public modules
pub mod api;
pub mod database;
pub mod import;
pub mod layer;
pub mod schema;
pub mod sql;

// Public exports
pub use layer::AdminLayer;
pub use schema::{
    ColumnDefinition, ColumnInfo, ColumnType, ColumnValues, Condition, ImportSummary, Operator,
    Row, RowFilter, TableData, Value,
};

// Re-export store accessors
pub use database::traits::{AccessorError, StoreAccessor};

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteAccessor;

#[cfg(feature = "mysql")]
pub use database::mysql::MySqlAccessor;

pub type Result<T> = std::result::Result<T, AccessorError>;
