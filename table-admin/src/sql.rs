//! Statement construction
//!
//! Identifiers (database, table and column names) are checked against an
//! allow-list and quoted before they reach statement text. Values never do:
//! they are returned as parameters and bound through `?` placeholders.

use crate::database::traits::AccessorError;
use crate::schema::{ColumnDefinition, ColumnValues, Operator, RowFilter, Value};

/// Longest identifier accepted (MySQL's limit for schema, table and column names)
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// SQL dialect of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// Statement text plus the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<Value>,
}

/// Check that `name` is safe to use as an identifier
///
/// Accepts 1 to 64 ASCII letters, digits and underscores. `kind` names the
/// identifier in the error message ("database", "table", "column").
pub fn validate_identifier(kind: &str, name: &str) -> Result<(), AccessorError> {
    if name.is_empty() {
        return Err(AccessorError::Validation(format!("A {} name is required", kind)));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(AccessorError::Validation(format!(
            "The {} name '{}' is longer than {} characters",
            kind, name, MAX_IDENTIFIER_LENGTH
        )));
    }

    if !name.chars().all(|character| character.is_ascii_alphanumeric() || character == '_') {
        return Err(AccessorError::Validation(format!(
            "Invalid {} name '{}': only letters, digits and underscores are allowed",
            kind, name
        )));
    }

    Ok(())
}

impl Dialect {
    /// Quote an identifier, doubling any embedded quote character
    pub fn quote_identifier(self, identifier: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            Dialect::Sqlite => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }

    /// Reference to `table` inside `database`
    ///
    /// SQLite keeps one database per connection pool, so only MySQL qualifies
    /// the table with its schema.
    pub fn table_reference(self, database: &str, table: &str) -> String {
        match self {
            Dialect::MySql => format!(
                "{}.{}",
                self.quote_identifier(database),
                self.quote_identifier(table)
            ),
            Dialect::Sqlite => self.quote_identifier(table),
        }
    }

    /// Build a CREATE TABLE statement
    pub fn create_table(
        self,
        table_reference: &str,
        columns: &[ColumnDefinition],
        if_not_exists: bool,
    ) -> Result<String, AccessorError> {
        if columns.is_empty() {
            return Err(AccessorError::Validation(
                "A table needs at least one column".to_string(),
            ));
        }

        let mut definitions = Vec::with_capacity(columns.len() + 1);
        for column in columns {
            validate_identifier("column", &column.name)?;
            definitions.push(format!(
                "{} {}",
                self.quote_identifier(&column.name),
                column.column_type
            ));
        }

        let primary_key: Vec<String> = columns
            .iter()
            .filter(|column| column.primary_key)
            .map(|column| self.quote_identifier(&column.name))
            .collect();
        if !primary_key.is_empty() {
            definitions.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
        }

        Ok(format!(
            "CREATE TABLE {}{} ({})",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            table_reference,
            definitions.join(", ")
        ))
    }

    /// Build an INSERT statement with one placeholder per column
    pub fn insert(self, table_reference: &str, columns: &[String]) -> Result<String, AccessorError> {
        for column in columns {
            validate_identifier("column", column)?;
        }

        let quoted: Vec<String> = columns.iter().map(|column| self.quote_identifier(column)).collect();
        let placeholders = vec!["?"; columns.len()];

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_reference,
            quoted.join(", "),
            placeholders.join(", ")
        ))
    }

    /// Build an UPDATE statement setting `values` on the rows matching `filter`
    pub fn update(
        self,
        table_reference: &str,
        values: &ColumnValues,
        filter: &RowFilter,
    ) -> Result<Statement, AccessorError> {
        if values.is_empty() {
            return Err(AccessorError::Validation(
                "At least one column value is required".to_string(),
            ));
        }

        let mut assignments = Vec::with_capacity(values.len());
        let mut parameters = Vec::with_capacity(values.len() + filter.conditions().len());
        for (column, value) in values {
            validate_identifier("column", column)?;
            assignments.push(format!("{} = ?", self.quote_identifier(column)));
            parameters.push(value.clone());
        }

        let (where_clause, filter_parameters) = self.where_clause(filter)?;
        parameters.extend(filter_parameters);

        Ok(Statement {
            sql: format!(
                "UPDATE {} SET {}{}",
                table_reference,
                assignments.join(", "),
                where_clause
            ),
            parameters,
        })
    }

    /// Build a DELETE statement removing the rows matching `filter`
    pub fn delete(self, table_reference: &str, filter: &RowFilter) -> Result<Statement, AccessorError> {
        let (where_clause, parameters) = self.where_clause(filter)?;

        Ok(Statement {
            sql: format!("DELETE FROM {}{}", table_reference, where_clause),
            parameters,
        })
    }

    /// Build a WHERE clause from a row filter
    ///
    /// An empty filter is rejected: it would touch every row of the table.
    fn where_clause(self, filter: &RowFilter) -> Result<(String, Vec<Value>), AccessorError> {
        if filter.is_empty() {
            return Err(AccessorError::Validation(
                "A row filter with at least one condition is required".to_string(),
            ));
        }

        let mut conditions = Vec::with_capacity(filter.conditions().len());
        let mut parameters = Vec::new();

        for condition in filter.conditions() {
            validate_identifier("column", &condition.column)?;
            let quoted_column = self.quote_identifier(&condition.column);

            if condition.value.is_null() {
                match condition.operator {
                    Operator::Equal => conditions.push(format!("{} IS NULL", quoted_column)),
                    Operator::NotEqual => conditions.push(format!("{} IS NOT NULL", quoted_column)),
                    operator => {
                        return Err(AccessorError::Validation(format!(
                            "Operator {} cannot be compared with NULL (column '{}')",
                            operator.as_sql(),
                            condition.column
                        )));
                    }
                }
            } else {
                conditions.push(format!("{} {} ?", quoted_column, condition.operator.as_sql()));
                parameters.push(condition.value.clone());
            }
        }

        Ok((format!(" WHERE {}", conditions.join(" AND ")), parameters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::Sqlite.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Sqlite.quote_identifier("table\"name"), "\"table\"\"name\"");
        assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
        assert_eq!(Dialect::MySql.quote_identifier("table`name"), "`table``name`");
    }

    #[test]
    fn test_table_reference() {
        assert_eq!(Dialect::MySql.table_reference("shop", "orders"), "`shop`.`orders`");
        assert_eq!(Dialect::Sqlite.table_reference("shop", "orders"), "\"orders\"");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("table", "orders_2024").is_ok());
        assert!(validate_identifier("table", "2024").is_ok());

        let too_long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        for name in ["", "my table", "x;DROP TABLE y", "name'", "na\"me", "naïve", too_long.as_str()] {
            assert!(
                matches!(validate_identifier("table", name), Err(AccessorError::Validation(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_create_table() {
        let columns = vec![
            ColumnDefinition::new("id", ColumnType::Integer).primary_key(),
            ColumnDefinition::new("name", ColumnType::VarChar(100)),
        ];

        let sql = Dialect::MySql
            .create_table("`shop`.`people`", &columns, false)
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `shop`.`people` (`id` INTEGER, `name` VARCHAR(100), PRIMARY KEY (`id`))"
        );

        let sql = Dialect::Sqlite
            .create_table("\"people\"", &columns[1..], true)
            .unwrap();
        assert_eq!(sql, "CREATE TABLE IF NOT EXISTS \"people\" (\"name\" VARCHAR(100))");
    }

    #[test]
    fn test_create_table_rejects_bad_columns() {
        assert!(Dialect::Sqlite.create_table("\"t\"", &[], false).is_err());

        let columns = vec![ColumnDefinition::new("bad name", ColumnType::Text)];
        assert!(matches!(
            Dialect::Sqlite.create_table("\"t\"", &columns, false),
            Err(AccessorError::Validation(_))
        ));
    }

    #[test]
    fn test_insert() {
        let sql = Dialect::Sqlite
            .insert("\"people\"", &["id".to_string(), "name".to_string()])
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"people\" (\"id\", \"name\") VALUES (?, ?)");
    }

    #[test]
    fn test_update_binds_values_and_filter() {
        let mut values = ColumnValues::new();
        values.insert("name".to_string(), Value::from("Grace"));
        values.insert("age".to_string(), Value::Integer(45));
        let filter = RowFilter::new().equals("id", 3_i64);

        let statement = Dialect::MySql.update("`people`", &values, &filter).unwrap();
        assert_eq!(statement.sql, "UPDATE `people` SET `age` = ?, `name` = ? WHERE `id` = ?");
        assert_eq!(
            statement.parameters,
            vec![Value::Integer(45), Value::from("Grace"), Value::Integer(3)]
        );
    }

    #[test]
    fn test_update_requires_values_and_filter() {
        let filter = RowFilter::new().equals("id", 3_i64);
        assert!(Dialect::Sqlite.update("\"t\"", &ColumnValues::new(), &filter).is_err());

        let mut values = ColumnValues::new();
        values.insert("name".to_string(), Value::from("x"));
        assert!(matches!(
            Dialect::Sqlite.update("\"t\"", &values, &RowFilter::new()),
            Err(AccessorError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_with_null_conditions() {
        let filter = RowFilter::new()
            .equals("name", "O'Brien")
            .equals("email", Value::Null)
            .condition("phone", Operator::NotEqual, Value::Null);

        let statement = Dialect::Sqlite.delete("\"people\"", &filter).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM \"people\" WHERE \"name\" = ? AND \"email\" IS NULL AND \"phone\" IS NOT NULL"
        );
        assert_eq!(statement.parameters, vec![Value::from("O'Brien")]);
    }

    #[test]
    fn test_delete_rejects_null_ordering() {
        let filter = RowFilter::new().condition("age", Operator::LessThan, Value::Null);
        assert!(matches!(
            Dialect::Sqlite.delete("\"people\"", &filter),
            Err(AccessorError::Validation(_))
        ));
    }
}
