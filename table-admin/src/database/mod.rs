//! Database access layer
//!
//! This module provides a backend-agnostic interface for database
//! administration and row editing.

pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub mod mysql;

// Re-export the main trait
pub use traits::{AccessorError, StoreAccessor};
