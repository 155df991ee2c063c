//! Row and response types
//!
//! Rows map the `country` table's PascalCase columns; responses serialize with
//! snake_case keys.

use serde::Serialize;
use sqlx::FromRow;

/// One row of the `country` table
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Country {
    #[sqlx(rename = "CountryName")]
    pub country_name: String,
    #[sqlx(rename = "CapitalName")]
    pub capital_name: Option<String>,
    #[sqlx(rename = "CapitalLatitude")]
    pub capital_latitude: Option<f64>,
    #[sqlx(rename = "CapitalLongitude")]
    pub capital_longitude: Option<f64>,
    #[sqlx(rename = "CountryCode")]
    pub country_code: Option<String>,
    #[sqlx(rename = "ContinentName")]
    pub continent_name: Option<String>,
}

/// Short form used in continent listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CountrySummary {
    #[sqlx(rename = "CountryName")]
    pub country_name: String,
    #[sqlx(rename = "CapitalName")]
    pub capital_name: Option<String>,
    #[sqlx(rename = "CountryCode")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContinentCount {
    pub name: Option<String>,
    pub country_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CountryPage {
    pub countries: Vec<Country>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_records: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<Country>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ContinentCountries {
    pub continent: String,
    pub countries: Vec<CountrySummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ContinentsResponse {
    pub continents: Vec<ContinentCount>,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_countries: i64,
    pub total_continents: i64,
    /// Local time of the request, ISO-8601 without offset
    pub last_updated: String,
}
