//! Statistics handlers for aggregates, comparisons and export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::WeekComparisonReport;
use crate::services::statistics::StatisticsService;
use crate::AppState;

#[derive(Deserialize)]
pub struct StatisticsQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

fn statistics_service(state: &AppState) -> StatisticsService {
    StatisticsService::new(state.store.clone(), state.week_start)
}

/// Get lifetime statistics per snack
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<impl IntoResponse> {
    let data = statistics_service(&state).compute_statistics().await?;

    if query.format.as_deref() == Some("csv") {
        let csv = StatisticsService::export_to_csv(&data)?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"snack_statistics.csv\"")],
            csv,
        ).into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Get re-order recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<RecommendationsResponse>> {
    let recommendations = statistics_service(&state).recommendations().await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Compare this calendar week with the previous one
pub async fn get_week_comparison(
    State(state): State<AppState>,
) -> AppResult<Json<WeekComparisonReport>> {
    let report = statistics_service(&state).compare_weeks(Utc::now()).await?;
    Ok(Json(report))
}
