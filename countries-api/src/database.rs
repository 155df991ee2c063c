use sqlx::sqlite::SqlitePool;

use crate::models::{ContinentCount, Country, CountrySummary};

const COUNTRY_COLUMNS: &str =
    "CountryName, CapitalName, CapitalLatitude, CapitalLongitude, CountryCode, ContinentName";

pub async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS country (
            CountryName VARCHAR(100) PRIMARY KEY,
            CapitalName VARCHAR(100),
            CapitalLatitude REAL,
            CapitalLongitude REAL,
            CountryCode VARCHAR(3),
            ContinentName VARCHAR(100)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a sample set of countries unless the table already has rows
pub async fn seed(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    if count_countries(pool).await? > 0 {
        // Data already seeded
        return Ok(());
    }

    // (country, capital, latitude, longitude, code, continent)
    let countries = [
        ("Argentina", "Buenos Aires", -34.583333, -58.666667, "AR", "South America"),
        ("Australia", "Canberra", -35.266667, 149.133333, "AU", "Australia"),
        ("Austria", "Vienna", 48.2, 16.366667, "AT", "Europe"),
        ("Brazil", "Brasilia", -15.783333, -47.916667, "BR", "South America"),
        ("Canada", "Ottawa", 45.416667, -75.7, "CA", "North America"),
        ("Chile", "Santiago", -33.45, -70.666667, "CL", "South America"),
        ("China", "Beijing", 39.916667, 116.383333, "CN", "Asia"),
        ("Egypt", "Cairo", 30.05, 31.25, "EG", "Africa"),
        ("Finland", "Helsinki", 60.166667, 24.933333, "FI", "Europe"),
        ("France", "Paris", 48.866667, 2.333333, "FR", "Europe"),
        ("Germany", "Berlin", 52.516667, 13.4, "DE", "Europe"),
        ("Ghana", "Accra", 5.55, -0.216667, "GH", "Africa"),
        ("Iceland", "Reykjavik", 64.15, -21.95, "IS", "Europe"),
        ("India", "New Delhi", 28.6, 77.2, "IN", "Asia"),
        ("Indonesia", "Jakarta", -6.166667, 106.816667, "ID", "Asia"),
        ("Ireland", "Dublin", 53.316667, -6.233333, "IE", "Europe"),
        ("Japan", "Tokyo", 35.683333, 139.75, "JP", "Asia"),
        ("Kenya", "Nairobi", -1.283333, 36.816667, "KE", "Africa"),
        ("Mexico", "Mexico City", 19.433333, -99.133333, "MX", "Central America"),
        ("Morocco", "Rabat", 34.016667, -6.816667, "MA", "Africa"),
        ("New Zealand", "Wellington", -41.3, 174.783333, "NZ", "Australia"),
        ("Nigeria", "Abuja", 9.083333, 7.533333, "NG", "Africa"),
        ("Norway", "Oslo", 59.916667, 10.75, "NO", "Europe"),
        ("Peru", "Lima", -12.05, -77.05, "PE", "South America"),
        ("Poland", "Warsaw", 52.25, 21.0, "PL", "Europe"),
        ("South Africa", "Pretoria", -25.7, 28.216667, "ZA", "Africa"),
        ("South Korea", "Seoul", 37.55, 126.983333, "KR", "Asia"),
        ("Spain", "Madrid", 40.4, -3.683333, "ES", "Europe"),
        ("Thailand", "Bangkok", 13.75, 100.516667, "TH", "Asia"),
        ("United States", "Washington", 38.883333, -77.0, "US", "North America"),
    ];

    for (name, capital, latitude, longitude, code, continent) in countries {
        let country = Country {
            country_name: name.to_string(),
            capital_name: Some(capital.to_string()),
            capital_latitude: Some(latitude),
            capital_longitude: Some(longitude),
            country_code: Some(code.to_string()),
            continent_name: Some(continent.to_string()),
        };
        insert_country(pool, &country).await?;
    }

    tracing::info!(count = countries.len(), "Sample countries seeded");
    Ok(())
}

pub async fn insert_country(pool: &SqlitePool, country: &Country) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO country ({}) VALUES (?, ?, ?, ?, ?, ?)",
        COUNTRY_COLUMNS
    ))
    .bind(&country.country_name)
    .bind(&country.capital_name)
    .bind(country.capital_latitude)
    .bind(country.capital_longitude)
    .bind(&country.country_code)
    .bind(&country.continent_name)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

pub async fn count_countries(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM country")
        .fetch_one(pool)
        .await
}

pub async fn count_continents(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(DISTINCT ContinentName) FROM country")
        .fetch_one(pool)
        .await
}

/// One page of countries in name order
pub async fn list_countries(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Country>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM country ORDER BY CountryName LIMIT ? OFFSET ?",
        COUNTRY_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Countries whose name contains `term`, ignoring ASCII case
///
/// `%` and `_` in the term match themselves.
pub async fn search_countries(pool: &SqlitePool, term: &str) -> Result<Vec<Country>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM country WHERE CountryName LIKE ? ESCAPE '\\' ORDER BY CountryName",
        COUNTRY_COLUMNS
    ))
    .bind(format!("%{}%", escape_like(term)))
    .fetch_all(pool)
    .await
}

pub async fn countries_in_continent(
    pool: &SqlitePool,
    continent: &str,
) -> Result<Vec<CountrySummary>, sqlx::Error> {
    sqlx::query_as(
        "SELECT CountryName, CapitalName, CountryCode FROM country WHERE ContinentName = ? ORDER BY CountryName",
    )
    .bind(continent)
    .fetch_all(pool)
    .await
}

pub async fn find_country(pool: &SqlitePool, name: &str) -> Result<Option<Country>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM country WHERE CountryName = ?",
        COUNTRY_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn continent_counts(pool: &SqlitePool) -> Result<Vec<ContinentCount>, sqlx::Error> {
    sqlx::query_as(
        "SELECT ContinentName AS name, COUNT(CountryName) AS country_count FROM country GROUP BY ContinentName ORDER BY ContinentName",
    )
    .fetch_all(pool)
    .await
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for character in term.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}
