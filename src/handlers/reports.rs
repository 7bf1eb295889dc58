// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState};

// GET /api/reports/summary
pub async fn get_summary(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/reports/inventory
pub async fn get_inventory_report(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = app_state.dashboard_service.get_inventory_report().await?;
    Ok((StatusCode::OK, Json(report)))
}
