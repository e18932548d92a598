//! Captured-exchange query and retention handlers

use crate::capture::ExchangeRecord;
use crate::error::AppError;
use crate::handlers::AppState;
use axum::extract::{Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EndpointQuery {
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// ISO date, `yyyy-MM-dd`
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanQuery {
    #[serde(default = "default_days_to_keep")]
    pub days_to_keep: u64,
}

fn default_days_to_keep() -> u64 {
    30
}

/// GET /api-docs/logs - All captured exchanges, newest first
pub async fn get_all_logs(State(state): State<AppState>) -> Json<Vec<ExchangeRecord>> {
    Json(state.store.get_all())
}

/// GET /api-docs/logs/endpoint?endpoint=/api/users - Exchanges for one endpoint
pub async fn get_logs_by_endpoint(
    State(state): State<AppState>,
    Query(params): Query<EndpointQuery>,
) -> Json<Vec<ExchangeRecord>> {
    Json(state.store.get_by_endpoint(&params.endpoint))
}

/// GET /api-docs/logs/date?date=2024-01-01 - Exchanges captured on one day
pub async fn get_logs_by_date(
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Vec<ExchangeRecord>>, AppError> {
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidParameter(format!(
            "date must be yyyy-MM-dd, got \"{}\"",
            params.date
        ))
    })?;
    Ok(Json(state.store.get_by_date(date)))
}

/// DELETE /api-docs/logs/clean?daysToKeep=30 - Drop exchanges older than the cutoff
pub async fn clean_old_logs(
    State(state): State<AppState>,
    Query(params): Query<CleanQuery>,
) -> &'static str {
    state.store.clean_older_than(params.days_to_keep);
    "Old logs cleaned successfully"
}
