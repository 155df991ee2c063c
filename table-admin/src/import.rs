//! CSV parsing for table imports

use std::path::Path;

use crate::database::traits::AccessorError;
use crate::sql::validate_identifier;

/// A parsed CSV file: header names and text records
#[derive(Debug, Clone, PartialEq)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// Read and parse a CSV file
pub async fn read_csv(source: &Path) -> Result<CsvData, AccessorError> {
    let contents = tokio::fs::read(source).await.map_err(|error| {
        AccessorError::Import(format!("Cannot read '{}': {}", source.display(), error))
    })?;

    parse_csv(&contents)
}

/// Parse comma-delimited data whose first row holds the column names
///
/// Every record must have as many fields as the header. Header names must be
/// valid identifiers since they become column names.
pub fn parse_csv(contents: &[u8]) -> Result<CsvData, AccessorError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(contents);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(AccessorError::Import(
            "The file has no header row".to_string(),
        ));
    }

    for header in &headers {
        validate_identifier("column", header)?;
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(String::from).collect());
    }

    Ok(CsvData { headers, records })
}
