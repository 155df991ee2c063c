//! SQLite store accessor
//!
//! A data directory plays the role of the server: every `<name>.db` file in it
//! is one database, served by its own connection pool.

use crate::database::traits::{AccessorError, StoreAccessor};
use crate::import::read_csv;
use crate::schema::{
    ColumnDefinition, ColumnInfo, ColumnType, ColumnValues, ImportSummary, RowFilter, TableData,
    Value,
};
use crate::sql::{validate_identifier, Dialect};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions, SqliteRow};
use sqlx::{Connection, Database, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const DIALECT: Dialect = Dialect::Sqlite;

/// File extension of database files inside the data directory
const DATABASE_EXTENSION: &str = "db";

/// SQLite store accessor
pub struct SqliteAccessor {
    directory: PathBuf,
    pools: Mutex<HashMap<String, SqlitePool>>,
}

impl SqliteAccessor {
    /// Open a data directory, creating it if needed
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory holding one `.db` file per database
    pub async fn connect(directory: impl Into<PathBuf>) -> Result<Self, AccessorError> {
        let directory = directory.into();

        tokio::fs::create_dir_all(&directory).await.map_err(|error| {
            AccessorError::Connection(format!(
                "Cannot open data directory '{}': {}",
                directory.display(),
                error
            ))
        })?;

        tracing::info!(directory = %directory.display(), "Opened SQLite data directory");

        Ok(Self {
            directory,
            pools: Mutex::new(HashMap::new()),
        })
    }

    fn database_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", name, DATABASE_EXTENSION))
    }

    async fn open_pool(path: &Path, create: bool) -> Result<SqlitePool, AccessorError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create)
            .foreign_keys(true);

        SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|error| AccessorError::Connection(error.to_string()))
    }

    /// Get the pool of an existing database, opening it on first use
    async fn pool(&self, database: &str) -> Result<SqlitePool, AccessorError> {
        validate_identifier("database", database)?;

        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(database) {
            return Ok(pool.clone());
        }

        let path = self.database_path(database);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AccessorError::NotFound(format!("Unknown database '{}'", database)));
        }

        let pool = Self::open_pool(&path, false).await?;
        pools.insert(database.to_string(), pool.clone());
        Ok(pool)
    }

    async fn table_exists(connection: &mut SqliteConnection, table: &str) -> Result<bool, AccessorError> {
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name = ? COLLATE NOCASE AND name NOT LIKE 'sqlite_%'",
        )
        .bind(table)
        .fetch_optional(connection)
        .await?;

        Ok(exists.is_some())
    }

    /// Read column information using PRAGMA table_info
    async fn table_columns(
        connection: &mut SqliteConnection,
        table: &str,
    ) -> Result<(Vec<ColumnInfo>, Option<Vec<String>>), AccessorError> {
        let query = format!("PRAGMA table_info({})", DIALECT.quote_identifier(table));
        let column_rows = sqlx::query(&query).fetch_all(connection).await?;

        let mut columns = Vec::with_capacity(column_rows.len());
        let mut primary_key_columns = Vec::new();

        for row in column_rows {
            // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i32 = row.try_get("notnull")?;
            let default_value: Option<String> = row.try_get("dflt_value").ok().flatten();
            let primary_key: i32 = row.try_get("pk")?;

            let is_primary_key = primary_key > 0;
            if is_primary_key {
                primary_key_columns.push((primary_key, name.clone()));
            }

            columns.push(ColumnInfo {
                name,
                data_type,
                nullable: not_null == 0,
                default_value,
                is_primary_key,
            });
        }

        // Sort primary key columns by their pk order and extract names
        primary_key_columns.sort_by_key(|(order, _)| *order);
        let primary_key = if primary_key_columns.is_empty() {
            None
        } else {
            Some(primary_key_columns.into_iter().map(|(_, name)| name).collect())
        };

        Ok((columns, primary_key))
    }

    /// Extract the value at `index`, following the value's storage class
    fn extract_value(row: &SqliteRow, index: usize) -> Result<Value, AccessorError> {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }

        let type_info = raw.type_info();
        match type_info.name() {
            "INTEGER" | "BOOLEAN" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::Integer(value));
                }
            }
            "REAL" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    return Ok(Value::Float(value));
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                    return Ok(Value::Text(String::from_utf8_lossy(&value).into_owned()));
                }
            }
            _ => {
                if let Ok(value) = row.try_get::<String, _>(index) {
                    return Ok(Value::Text(value));
                }
            }
        }

        // Fallback: try common types in order
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(Value::Integer(value));
        }
        if let Ok(value) = row.try_get::<f64, _>(index) {
            return Ok(Value::Float(value));
        }
        if let Ok(value) = row.try_get::<String, _>(index) {
            return Ok(Value::Text(value));
        }

        Ok(Value::Null)
    }

    fn bind_parameters<'q>(
        mut query: Query<'q, Sqlite, <Sqlite as Database>::Arguments<'q>>,
        parameters: &'q [Value],
    ) -> Query<'q, Sqlite, <Sqlite as Database>::Arguments<'q>> {
        for parameter in parameters {
            query = match parameter {
                Value::Null => query.bind(None::<String>),
                Value::Integer(value) => query.bind(*value),
                Value::Float(value) => query.bind(*value),
                Value::Text(value) => query.bind(value.as_str()),
            };
        }
        query
    }
}

#[async_trait]
impl StoreAccessor for SqliteAccessor {
    async fn create_database(&self, name: &str) -> Result<(), AccessorError> {
        validate_identifier("database", name)?;

        let mut pools = self.pools.lock().await;
        let path = self.database_path(name);
        if pools.contains_key(name) || tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AccessorError::Query(format!(
                "Can't create database '{}'; database exists",
                name
            )));
        }

        let pool = Self::open_pool(&path, true).await?;
        pools.insert(name.to_string(), pool);

        tracing::info!(database = %name, "Created database");
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<String>, AccessorError> {
        let mut entries = tokio::fs::read_dir(&self.directory)
            .await
            .map_err(|error| AccessorError::Query(error.to_string()))?;

        let mut databases = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| AccessorError::Query(error.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|extension| extension.to_str()) != Some(DATABASE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                // Files that could not have been created through this accessor are skipped
                if validate_identifier("database", name).is_ok() {
                    databases.push(name.to_string());
                }
            }
        }

        databases.sort();
        Ok(databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, AccessorError> {
        let pool = self.pool(database).await?;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await?;

        Ok(tables)
    }

    async fn read_table(&self, database: &str, table: &str) -> Result<TableData, AccessorError> {
        validate_identifier("table", table)?;
        let pool = self.pool(database).await?;

        let mut connection = pool.acquire().await?;
        if !Self::table_exists(&mut connection, table).await? {
            return Err(AccessorError::NotFound(format!(
                "Table '{}' doesn't exist in database '{}'",
                table, database
            )));
        }

        let (columns, primary_key) = Self::table_columns(&mut connection, table).await?;

        let select_query = format!("SELECT * FROM {}", DIALECT.table_reference(database, table));
        let rows = sqlx::query(&select_query).fetch_all(&mut *connection).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in &rows {
            let values = (0..row.len())
                .map(|index| Self::extract_value(row, index))
                .collect::<Result<Vec<_>, _>>()?;
            data.push(values);
        }

        tracing::debug!(database = %database, table = %table, rows = data.len(), "Read table");

        Ok(TableData {
            name: table.to_string(),
            columns,
            primary_key,
            rows: data,
        })
    }

    async fn create_table(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDefinition],
    ) -> Result<(), AccessorError> {
        validate_identifier("table", table)?;
        let pool = self.pool(database).await?;

        let statement = DIALECT.create_table(&DIALECT.table_reference(database, table), columns, false)?;
        sqlx::query(&statement).execute(&pool).await?;

        tracing::info!(database = %database, table = %table, columns = columns.len(), "Created table");
        Ok(())
    }

    async fn import_csv(
        &self,
        database: &str,
        table: &str,
        source: &Path,
    ) -> Result<ImportSummary, AccessorError> {
        validate_identifier("table", table)?;
        let pool = self.pool(database).await?;
        let data = read_csv(source).await?;

        let table_reference = DIALECT.table_reference(database, table);
        let columns: Vec<ColumnDefinition> = data
            .headers
            .iter()
            .map(|header| ColumnDefinition::new(header.clone(), ColumnType::IMPORTED))
            .collect();
        let create_statement = DIALECT.create_table(&table_reference, &columns, true)?;
        let insert_statement = DIALECT.insert(&table_reference, &data.headers)?;

        let mut connection = pool.acquire().await?;
        let created_table = !Self::table_exists(&mut connection, table).await?;
        sqlx::query(&create_statement).execute(&mut *connection).await?;

        // Dropping the transaction on any early return rolls the rows back
        let mut transaction = connection.begin().await?;
        for (index, record) in data.records.iter().enumerate() {
            let mut query = sqlx::query(&insert_statement);
            for field in record {
                query = query.bind(field.as_str());
            }
            query.execute(&mut *transaction).await.map_err(|error| {
                AccessorError::Import(format!("Record {} could not be inserted: {}", index + 1, error))
            })?;
        }

        transaction.commit().await?;

        let rows_imported = data.records.len() as u64;
        tracing::info!(
            database = %database,
            table = %table,
            rows = rows_imported,
            created_table,
            "Imported CSV file"
        );

        Ok(ImportSummary {
            table: table.to_string(),
            rows_imported,
            created_table,
        })
    }

    async fn update_row(
        &self,
        database: &str,
        table: &str,
        values: &ColumnValues,
        filter: &RowFilter,
    ) -> Result<u64, AccessorError> {
        validate_identifier("table", table)?;
        let pool = self.pool(database).await?;

        let statement = DIALECT.update(&DIALECT.table_reference(database, table), values, filter)?;
        let result = Self::bind_parameters(sqlx::query(&statement.sql), &statement.parameters)
            .execute(&pool)
            .await?;

        tracing::info!(
            database = %database,
            table = %table,
            filter = %filter,
            affected_rows = result.rows_affected(),
            "Updated rows"
        );
        Ok(result.rows_affected())
    }

    async fn delete_row(
        &self,
        database: &str,
        table: &str,
        filter: &RowFilter,
    ) -> Result<u64, AccessorError> {
        validate_identifier("table", table)?;
        let pool = self.pool(database).await?;

        let statement = DIALECT.delete(&DIALECT.table_reference(database, table), filter)?;
        let result = Self::bind_parameters(sqlx::query(&statement.sql), &statement.parameters)
            .execute(&pool)
            .await?;

        tracing::info!(
            database = %database,
            table = %table,
            filter = %filter,
            affected_rows = result.rows_affected(),
            "Deleted rows"
        );
        Ok(result.rows_affected())
    }

    async fn close(&self) {
        let pools = self.pools.lock().await;
        for pool in pools.values() {
            pool.close().await;
        }
    }
}
