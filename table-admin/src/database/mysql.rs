//! MySQL store accessor implementation

use crate::database::traits::{AccessorError, StoreAccessor};
use crate::import::read_csv;
use crate::schema::{
    ColumnDefinition, ColumnInfo, ColumnType, ColumnValues, ImportSummary, RowFilter, TableData,
    Value,
};
use crate::sql::{validate_identifier, Dialect};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Database, MySql, MySqlPool, Row, TypeInfo, ValueRef};
use std::path::Path;

const DIALECT: Dialect = Dialect::MySql;

/// Port used when the host carries no `:port` suffix
pub const DEFAULT_PORT: u16 = 3306;

/// MySQL store accessor
pub struct MySqlAccessor {
    pool: MySqlPool,
}

/// Row shape of the information_schema.COLUMNS query
#[derive(sqlx::FromRow)]
struct ColumnRow {
    name: String,
    data_type: String,
    is_nullable: String,
    default_value: Option<String>,
}

impl MySqlAccessor {
    /// Open a session to a MySQL server
    ///
    /// No database is selected; every table-scoped call names its database.
    ///
    /// # Arguments
    ///
    /// * `host` - Server host name, optionally followed by `:port`
    /// * `user` - User name
    /// * `password` - Password
    pub async fn connect(host: &str, user: &str, password: &str) -> Result<Self, AccessorError> {
        let (hostname, port) = split_host(host)?;

        let options = MySqlConnectOptions::new()
            .host(hostname)
            .port(port)
            .username(user)
            .password(password);

        let accessor = Self::connect_with(options, MySqlPoolOptions::new()).await?;
        tracing::info!(host = %hostname, port, user = %user, "Connected to MySQL server");

        Ok(accessor)
    }

    /// Open a session with explicit connection and pool options
    ///
    /// Any failure to establish the first connection is reported as
    /// [`AccessorError::Connection`].
    pub async fn connect_with(
        options: MySqlConnectOptions,
        pool_options: MySqlPoolOptions,
    ) -> Result<Self, AccessorError> {
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|error| AccessorError::Connection(error.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Create an accessor over an existing pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn ensure_database(&self, database: &str) -> Result<(), AccessorError> {
        validate_identifier("database", database)?;

        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?",
        )
        .bind(database)
        .fetch_optional(&self.pool)
        .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(AccessorError::NotFound(format!("Unknown database '{}'", database))),
        }
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool, AccessorError> {
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM information_schema.TABLES WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?",
        )
        .bind(database)
        .bind(table)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exists.is_some())
    }

    /// Extract the value at `index` and convert it to a [`Value`]
    fn extract_value(row: &MySqlRow, index: usize) -> Result<Value, AccessorError> {
        if row.try_get_raw(index)?.is_null() {
            return Ok(Value::Null);
        }

        let type_info = row.column(index).type_info();
        match type_info.name() {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::Integer(value));
                }
            }
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => {
                if let Ok(value) = row.try_get::<u64, _>(index) {
                    // Values above i64::MAX keep their digits as text
                    return Ok(i64::try_from(value)
                        .map(Value::Integer)
                        .unwrap_or_else(|_| Value::Text(value.to_string())));
                }
            }
            "FLOAT" => {
                if let Ok(value) = row.try_get::<f32, _>(index) {
                    return Ok(Value::Float(value as f64));
                }
            }
            "DOUBLE" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    return Ok(Value::Float(value));
                }
            }
            "DATE" => {
                if let Ok(value) = row.try_get::<NaiveDate, _>(index) {
                    return Ok(Value::Text(value.to_string()));
                }
            }
            "DATETIME" => {
                if let Ok(value) = row.try_get::<NaiveDateTime, _>(index) {
                    return Ok(Value::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()));
                }
            }
            "TIMESTAMP" => {
                if let Ok(value) = row.try_get::<DateTime<Utc>, _>(index) {
                    return Ok(Value::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()));
                }
            }
            "TIME" => {
                if let Ok(value) = row.try_get::<NaiveTime, _>(index) {
                    return Ok(Value::Text(value.to_string()));
                }
            }
            _ => {
                if let Ok(value) = row.try_get::<String, _>(index) {
                    return Ok(Value::Text(value));
                }
            }
        }

        // Fallback: DECIMAL and other types the driver sends as text
        if let Ok(value) = row.try_get_unchecked::<String, _>(index) {
            return Ok(Value::Text(value));
        }
        if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
            return Ok(Value::Text(String::from_utf8_lossy(&value).into_owned()));
        }

        Ok(Value::Null)
    }

    fn bind_parameters<'q>(
        mut query: Query<'q, MySql, <MySql as Database>::Arguments<'q>>,
        parameters: &'q [Value],
    ) -> Query<'q, MySql, <MySql as Database>::Arguments<'q>> {
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

/// Split `host[:port]` into its parts
fn split_host(host: &str) -> Result<(&str, u16), AccessorError> {
    let (hostname, port) = match host.rsplit_once(':') {
        Some((hostname, port)) => {
            let port = port
                .parse()
                .map_err(|_| AccessorError::Validation(format!("Invalid port in host '{}'", host)))?;
            (hostname, port)
        }
        None => (host, DEFAULT_PORT),
    };

    if hostname.is_empty() {
        return Err(AccessorError::Validation("A host is required".to_string()));
    }

    Ok((hostname, port))
}

#[async_trait]
impl StoreAccessor for MySqlAccessor {
    async fn create_database(&self, name: &str) -> Result<(), AccessorError> {
        validate_identifier("database", name)?;

        let statement = format!("CREATE DATABASE {}", DIALECT.quote_identifier(name));
        sqlx::query(&statement).execute(&self.pool).await?;

        tracing::info!(database = %name, "Created database");
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<String>, AccessorError> {
        let databases: Vec<String> = sqlx::query_scalar(
            "SELECT CAST(SCHEMA_NAME AS CHAR) FROM information_schema.SCHEMATA ORDER BY SCHEMA_NAME",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, AccessorError> {
        self.ensure_database(database).await?;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME",
        )
        .bind(database)
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    async fn read_table(&self, database: &str, table: &str) -> Result<TableData, AccessorError> {
        validate_identifier("table", table)?;
        self.ensure_database(database).await?;

        let column_rows: Vec<ColumnRow> = sqlx::query_as(
            r#"
            SELECT CAST(COLUMN_NAME AS CHAR) AS name,
                   CAST(COLUMN_TYPE AS CHAR) AS data_type,
                   CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                   CAST(COLUMN_DEFAULT AS CHAR) AS default_value
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(database)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        if column_rows.is_empty() {
            return Err(AccessorError::NotFound(format!(
                "Table '{}' doesn't exist in database '{}'",
                table, database
            )));
        }

        let primary_key_columns: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT CAST(COLUMN_NAME AS CHAR)
            FROM information_schema.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(database)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let columns = column_rows
            .into_iter()
            .map(|row| ColumnInfo {
                is_primary_key: primary_key_columns.contains(&row.name),
                name: row.name,
                data_type: row.data_type,
                nullable: row.is_nullable == "YES",
                default_value: row.default_value,
            })
            .collect();

        let select_query = format!("SELECT * FROM {}", DIALECT.table_reference(database, table));
        let rows = sqlx::query(&select_query).fetch_all(&self.pool).await?;

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
            primary_key: (!primary_key_columns.is_empty()).then_some(primary_key_columns),
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
        self.ensure_database(database).await?;

        let statement = DIALECT.create_table(&DIALECT.table_reference(database, table), columns, false)?;
        sqlx::query(&statement).execute(&self.pool).await?;

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
        self.ensure_database(database).await?;
        let data = read_csv(source).await?;

        let table_reference = DIALECT.table_reference(database, table);
        let columns: Vec<ColumnDefinition> = data
            .headers
            .iter()
            .map(|header| ColumnDefinition::new(header.clone(), ColumnType::IMPORTED))
            .collect();
        let insert_statement = DIALECT.insert(&table_reference, &data.headers)?;

        // DDL commits implicitly in MySQL, so the table is created before the
        // row transaction starts.
        let created_table = !self.table_exists(database, table).await?;
        let create_statement = DIALECT.create_table(&table_reference, &columns, true)?;
        sqlx::query(&create_statement).execute(&self.pool).await?;

        let mut transaction = self.pool.begin().await?;
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
        self.ensure_database(database).await?;

        let statement = DIALECT.update(&DIALECT.table_reference(database, table), values, filter)?;
        let result = Self::bind_parameters(sqlx::query(&statement.sql), &statement.parameters)
            .execute(&self.pool)
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
        self.ensure_database(database).await?;

        let statement = DIALECT.delete(&DIALECT.table_reference(database, table), filter)?;
        let result = Self::bind_parameters(sqlx::query(&statement.sql), &statement.parameters)
            .execute(&self.pool)
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
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host() {
        assert_eq!(split_host("localhost").unwrap(), ("localhost", DEFAULT_PORT));
        assert_eq!(split_host("db.internal:3307").unwrap(), ("db.internal", 3307));
        assert!(matches!(split_host("localhost:abc"), Err(AccessorError::Validation(_))));
        assert!(matches!(split_host(""), Err(AccessorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        // Nothing listens on port 1; the short timeout bounds sqlx's connect retries
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("root");
        let pool_options = MySqlPoolOptions::new().acquire_timeout(std::time::Duration::from_secs(1));

        let result = MySqlAccessor::connect_with(options, pool_options).await;
        assert!(matches!(result, Err(AccessorError::Connection(_))));
    }
}
