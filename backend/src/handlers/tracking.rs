//! HTTP handlers for weekly tracking endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{DeliveryInput, RecordTrackingInput, TrackingEntryInput, TrackingRecord};
use crate::services::tracking::{CurrentRecord, CurrentWeekEntry, TrackingService};
use crate::AppState;

/// Acknowledgement for tracking mutations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

/// Acknowledgement for a recorded delivery
#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    pub message: String,
    pub id: Uuid,
    pub initial_quantity: i32,
}

/// Acknowledgement for the bulk clear
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub deleted: u64,
}

fn tracking_service(state: &AppState) -> TrackingService {
    TrackingService::new(state.store.clone(), state.week_start)
}

/// List all tracking records, newest week first
pub async fn list_tracking(State(state): State<AppState>) -> AppResult<Json<Vec<TrackingRecord>>> {
    let records = tracking_service(&state).list_records().await?;
    Ok(Json(records))
}

/// Get a single tracking record
pub async fn get_tracking_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<TrackingRecord>> {
    let record = tracking_service(&state).get_record(record_id).await?;
    Ok(Json(record))
}

/// Record wastage or shortage against the snack's most recent week
pub async fn record_tracking(
    State(state): State<AppState>,
    payload: Result<Json<RecordTrackingInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    let record = tracking_service(&state)
        .record_wastage_or_shortage(input, Utc::now())
        .await?;
    Ok(Json(MessageResponse {
        message: "Tracking data updated successfully".to_string(),
        id: Some(record.id),
    }))
}

/// Correct a specific tracking record
pub async fn update_tracking_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    payload: Result<Json<TrackingEntryInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    tracking_service(&state)
        .update_by_id(record_id, input, Utc::now())
        .await?;
    Ok(Json(MessageResponse {
        message: "Tracking record updated successfully".to_string(),
        id: None,
    }))
}

/// Delete every tracking record
pub async fn clear_tracking(State(state): State<AppState>) -> AppResult<Json<ClearResponse>> {
    let deleted = tracking_service(&state).clear_all().await?;
    Ok(Json(ClearResponse {
        message: "All tracking records deleted".to_string(),
        deleted,
    }))
}

/// Records for the current calendar week, annotated with its bounds
pub async fn get_current_week(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CurrentWeekEntry>>> {
    let entries = tracking_service(&state)
        .current_week_summary(Utc::now())
        .await?;
    Ok(Json(entries))
}

/// A snack's record for the current week, if it has been delivered
pub async fn get_snack_current(
    State(state): State<AppState>,
    Path(snack_id): Path<Uuid>,
) -> AppResult<Json<CurrentRecord>> {
    let current = tracking_service(&state)
        .current_record(snack_id, Utc::now())
        .await?;
    Ok(Json(current))
}

/// A snack's most recent record
pub async fn get_snack_latest(
    State(state): State<AppState>,
    Path(snack_id): Path<Uuid>,
) -> AppResult<Json<TrackingRecord>> {
    let record = tracking_service(&state).find_most_recent(snack_id).await?;
    Ok(Json(record))
}

/// Add a completed delivery to the current week's record
pub async fn record_delivery(
    State(state): State<AppState>,
    payload: Result<Json<DeliveryInput>, JsonRejection>,
) -> AppResult<Json<DeliveryResponse>> {
    let Json(input) = payload?;
    let record = tracking_service(&state)
        .record_delivery(input, Utc::now())
        .await?;
    Ok(Json(DeliveryResponse {
        message: "Delivery recorded".to_string(),
        id: record.id,
        initial_quantity: record.initial_quantity,
    }))
}
