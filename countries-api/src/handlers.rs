//! Endpoint handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database;
use crate::error::ApiError;
use crate::models::{
    ContinentCountries, ContinentsResponse, Country, CountryPage, SearchResults, Stats,
};
use crate::ApplicationState;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Raw pagination parameters; values that are not integers fall back to the defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn positive_param(name: &str, raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
    let value = raw
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(default);

    if value < 1 {
        return Err(ApiError::Validation(format!("{} must be at least 1", name)));
    }
    Ok(value)
}

/// Handler for GET /api/countries
pub async fn list_countries_handler(
    State(state): State<ApplicationState>,
    Query(params): Query<PageParams>,
) -> Result<Json<CountryPage>, ApiError> {
    let page = positive_param("page", params.page.as_deref(), DEFAULT_PAGE)?;
    let per_page =
        positive_param("per_page", params.per_page.as_deref(), DEFAULT_PER_PAGE)?.min(MAX_PER_PAGE);

    let total_records = database::count_countries(&state.pool).await?;
    let total_pages = (total_records + per_page - 1) / per_page;

    // Page 1 of an empty table is an empty page
    if page > total_pages && page != 1 {
        return Err(ApiError::NotFound("Page not found".to_string()));
    }

    let countries = database::list_countries(&state.pool, per_page, (page - 1) * per_page).await?;

    Ok(Json(CountryPage {
        countries,
        total_pages,
        current_page: page,
        total_records,
    }))
}

/// Handler for GET /api/countries/search?q=
pub async fn search_countries_handler(
    State(state): State<ApplicationState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let term = match params.q.as_deref() {
        Some(term) if !term.is_empty() => term,
        _ => return Err(ApiError::Validation("Search query is required".to_string())),
    };

    let results = database::search_countries(&state.pool, term).await?;
    tracing::debug!(term = %term, count = results.len(), "Searched countries");

    Ok(Json(SearchResults {
        count: results.len(),
        results,
    }))
}

/// Handler for GET /api/countries/continent/{continent}
pub async fn continent_countries_handler(
    State(state): State<ApplicationState>,
    Path(continent): Path<String>,
) -> Result<Json<ContinentCountries>, ApiError> {
    let countries = database::countries_in_continent(&state.pool, &continent).await?;

    Ok(Json(ContinentCountries {
        continent,
        count: countries.len(),
        countries,
    }))
}

/// Handler for GET /api/countries/{country_name}
pub async fn country_handler(
    State(state): State<ApplicationState>,
    Path(country_name): Path<String>,
) -> Result<Json<Country>, ApiError> {
    database::find_country(&state.pool, &country_name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Country not found".to_string()))
}

/// Handler for GET /api/continents
pub async fn continents_handler(
    State(state): State<ApplicationState>,
) -> Result<Json<ContinentsResponse>, ApiError> {
    let continents = database::continent_counts(&state.pool).await?;
    Ok(Json(ContinentsResponse { continents }))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<ApplicationState>) -> Result<Json<Stats>, ApiError> {
    let total_countries = database::count_countries(&state.pool).await?;
    let total_continents = database::count_continents(&state.pool).await?;

    Ok(Json(Stats {
        total_countries,
        total_continents,
        last_updated: chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    }))
}

/// Handler for GET /api/health
pub async fn health_handler(
    State(state): State<ApplicationState>,
) -> Result<(StatusCode, &'static str), StatusCode> {
    database::ping(&state.pool).await.map_err(|error| {
        tracing::warn!("Health check failed: {}", error);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok((StatusCode::OK, "Server is healthy"))
}
