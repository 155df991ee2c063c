//! Schema and data types for dynamic database administration
//!
//! These types describe databases, tables and rows discovered at runtime,
//! plus the request and response bodies of the admin API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::database::traits::AccessorError;

/// A single cell value
///
/// Serialized as plain JSON: `null`, a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A row of values, positionally aligned with the table's columns
pub type Row = Vec<Value>;

/// New values for an update, keyed by column name
pub type ColumnValues = BTreeMap<String, Value>;

/// Column types accepted when creating a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    Text,
    VarChar(u16),
    Char(u8),
    Boolean,
    Date,
    DateTime,
    Timestamp,
}

impl ColumnType {
    /// Type given to every column of a table created by a CSV import
    pub const IMPORTED: ColumnType = ColumnType::VarChar(255);
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::Double => write!(f, "DOUBLE"),
            ColumnType::Decimal { precision, scale } => write!(f, "DECIMAL({},{})", precision, scale),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::VarChar(length) => write!(f, "VARCHAR({})", length),
            ColumnType::Char(length) => write!(f, "CHAR({})", length),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::DateTime => write!(f, "DATETIME"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = AccessorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_uppercase();
        let invalid = || AccessorError::Validation(format!("Unsupported column type: {}", input.trim()));

        // Split "VARCHAR(255)" into ("VARCHAR", Some("255"))
        let (name, arguments) = match normalized.find('(') {
            Some(open) => {
                let close = normalized.strip_suffix(')').ok_or_else(invalid)?;
                (normalized[..open].trim(), Some(&close[open + 1..]))
            }
            None => (normalized.as_str(), None),
        };

        let parse_length = |arguments: Option<&str>| -> Result<Option<u64>, AccessorError> {
            arguments
                .map(|argument| argument.trim().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        let column_type = match (name, arguments) {
            ("INT" | "INTEGER", None) => ColumnType::Integer,
            ("BIGINT", None) => ColumnType::BigInt,
            ("FLOAT" | "REAL", None) => ColumnType::Float,
            ("DOUBLE", None) => ColumnType::Double,
            ("TEXT", None) => ColumnType::Text,
            ("BOOL" | "BOOLEAN", None) => ColumnType::Boolean,
            ("DATE", None) => ColumnType::Date,
            ("DATETIME", None) => ColumnType::DateTime,
            ("TIMESTAMP", None) => ColumnType::Timestamp,
            ("DECIMAL", arguments) => {
                let (precision, scale) = match arguments {
                    None => (10, 0),
                    Some(arguments) => {
                        let mut parts = arguments.split(',');
                        let precision = parse_length(parts.next())?.unwrap_or(10);
                        let scale = parse_length(parts.next())?.unwrap_or(0);
                        if parts.next().is_some() {
                            return Err(invalid());
                        }
                        (precision, scale)
                    }
                };
                if !(1..=65).contains(&precision) || scale > 30 || scale > precision {
                    return Err(invalid());
                }
                ColumnType::Decimal {
                    precision: precision as u8,
                    scale: scale as u8,
                }
            }
            ("VARCHAR", Some(_)) => match parse_length(arguments)? {
                Some(length @ 1..=65535) => ColumnType::VarChar(length as u16),
                _ => return Err(invalid()),
            },
            ("CHAR", None) => ColumnType::Char(1),
            ("CHAR", Some(_)) => match parse_length(arguments)? {
                Some(length @ 1..=255) => ColumnType::Char(length as u8),
                _ => return Err(invalid()),
            },
            _ => return Err(invalid()),
        };

        Ok(column_type)
    }
}

impl TryFrom<String> for ColumnType {
    type Error = AccessorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.to_string()
    }
}

/// A column to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Whether this column is part of the primary key
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
        }
    }

    /// Mark this column as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Information about a single column, as discovered from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// SQL data type as reported by the store (e.g., "INTEGER", "varchar(255)")
    pub data_type: String,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
}

/// Full contents of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    /// Name of the table
    pub name: String,

    /// Columns in declared order
    pub columns: Vec<ColumnInfo>,

    /// Primary key column names (if any)
    pub primary_key: Option<Vec<String>>,

    /// Every row of the table
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Build a filter that addresses the row at `index`
    ///
    /// Uses the primary key when the table has one. Otherwise every column's
    /// current value is matched, which only identifies the row while it is
    /// unique and unchanged since it was read.
    pub fn row_filter(&self, index: usize) -> Option<RowFilter> {
        let row = self.rows.get(index)?;

        if let Some(primary_key) = self.primary_key.as_ref().filter(|key| !key.is_empty()) {
            let mut filter = RowFilter::new();
            for key_column in primary_key {
                let position = self.columns.iter().position(|column| &column.name == key_column)?;
                filter = filter.equals(key_column.clone(), row.get(position)?.clone());
            }
            tracing::debug!(table = %self.name, "Identifying row by primary key");
            return Some(filter);
        }

        tracing::debug!(table = %self.name, "Identifying row by full-row match (no primary key)");
        Some(RowFilter::full_row(
            self.columns.iter().map(|column| column.name.clone()),
            row.iter().cloned(),
        ))
    }
}

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "LIKE")]
    Like,
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Like => "LIKE",
        }
    }
}

/// One `column <operator> value` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    #[serde(default)]
    pub operator: Operator,
    pub value: Value,
}

/// Conditions joined with AND, identifying the rows to update or delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowFilter {
    conditions: Vec<Condition>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(mut self, column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn equals(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(column, Operator::Equal, value)
    }

    /// Match every column against its value
    pub fn full_row(
        columns: impl IntoIterator<Item = String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        columns
            .into_iter()
            .zip(values)
            .fold(Self::new(), |filter, (column, value)| filter.equals(column, value))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Renders the filter as a readable WHERE fragment for logs.
///
/// Never used to build statements; values are bound separately.
impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, condition) in self.conditions.iter().enumerate() {
            if index > 0 {
                write!(f, " AND ")?;
            }
            match (&condition.value, condition.operator) {
                (Value::Null, Operator::Equal) => write!(f, "{} IS NULL", condition.column)?,
                (Value::Null, Operator::NotEqual) => write!(f, "{} IS NOT NULL", condition.column)?,
                (Value::Text(text), operator) => {
                    write!(f, "{} {} '{}'", condition.column, operator.as_sql(), text)?
                }
                (value, operator) => write!(f, "{} {} {}", condition.column, operator.as_sql(), value)?,
            }
        }
        Ok(())
    }
}

/// Result of a CSV import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Table the rows were written to
    pub table: String,

    /// Number of rows inserted
    pub rows_imported: u64,

    /// Whether the table was created by this import
    pub created_table: bool,
}

/// Response from listing databases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasesResponse {
    pub databases: Vec<String>,
}

/// Response from listing tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

/// Human-readable outcome of a schema change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

/// Response for row mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedRowsResponse {
    pub affected_rows: u64,
}

/// Request to create a database
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub name: String,
}

/// Request to create a table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

/// Request to import a CSV file that is readable by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub path: std::path::PathBuf,
}

/// Request to update the rows matching a filter
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRowRequest {
    pub values: ColumnValues,
    pub filter: RowFilter,
}

/// Request to delete the rows matching a filter
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRowRequest {
    pub filter: RowFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, is_primary_key: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: "TEXT".to_string(),
            nullable: !is_primary_key,
            default_value: None,
            is_primary_key,
        }
    }

    #[test]
    fn test_parse_column_types() {
        assert_eq!("int".parse::<ColumnType>().unwrap(), ColumnType::Integer);
        assert_eq!("Varchar(255)".parse::<ColumnType>().unwrap(), ColumnType::VarChar(255));
        assert_eq!(" REAL ".parse::<ColumnType>().unwrap(), ColumnType::Float);
        assert_eq!("char".parse::<ColumnType>().unwrap(), ColumnType::Char(1));
        assert_eq!(
            "decimal(8, 2)".parse::<ColumnType>().unwrap(),
            ColumnType::Decimal { precision: 8, scale: 2 }
        );
        assert_eq!(ColumnType::IMPORTED.to_string(), "VARCHAR(255)");
    }

    #[test]
    fn test_reject_unknown_column_types() {
        for input in ["", "VARCHAR", "VARCHAR(0)", "VARCHAR(abc)", "TEXT; DROP TABLE x", "DECIMAL(2,5)", "BLOB"] {
            assert!(
                matches!(input.parse::<ColumnType>(), Err(AccessorError::Validation(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_column_definition_from_json() {
        let definition: ColumnDefinition =
            serde_json::from_str(r#"{"name": "id", "type": "integer", "primaryKey": true}"#).unwrap();
        assert_eq!(definition, ColumnDefinition::new("id", ColumnType::Integer).primary_key());

        let result = serde_json::from_str::<ColumnDefinition>(r#"{"name": "id", "type": "widget"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_value_json_shape() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, 5, 2.5, "five"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Null, Value::Integer(5), Value::Float(2.5), Value::Text("five".into())]
        );
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[null,5,2.5,"five"]"#);
    }

    #[test]
    fn test_row_filter_display() {
        let filter = RowFilter::new()
            .equals("name", "Ada")
            .equals("age", 36_i64)
            .equals("email", Value::Null)
            .condition("score", Operator::GreaterThan, 1.5);
        assert_eq!(filter.to_string(), "name = 'Ada' AND age = 36 AND email IS NULL AND score > 1.5");
    }

    #[test]
    fn test_row_filter_from_json_defaults_to_equality() {
        let filter: RowFilter =
            serde_json::from_str(r#"[{"column": "id", "value": 3}, {"column": "name", "operator": "LIKE", "value": "A%"}]"#)
                .unwrap();
        assert_eq!(filter, RowFilter::new().equals("id", 3_i64).condition("name", Operator::Like, "A%"));
    }

    #[test]
    fn test_row_filter_prefers_primary_key() {
        let table = TableData {
            name: "people".to_string(),
            columns: vec![column("id", true), column("name", false)],
            primary_key: Some(vec!["id".to_string()]),
            rows: vec![vec![Value::Integer(7), Value::Text("Ada".into())]],
        };

        assert_eq!(table.row_filter(0), Some(RowFilter::new().equals("id", 7_i64)));
        assert_eq!(table.row_filter(1), None);
    }

    #[test]
    fn test_row_filter_falls_back_to_full_row() {
        let table = TableData {
            name: "people".to_string(),
            columns: vec![column("id", false), column("name", false)],
            primary_key: None,
            rows: vec![vec![Value::Text("1".into()), Value::Null]],
        };

        assert_eq!(
            table.row_filter(0),
            Some(RowFilter::new().equals("id", "1").equals("name", Value::Null))
        );
    }
}
