// src/handlers/stock.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    models::inventory::MovementType,
    services::{
        intake::AdjustmentPayload,
        movement_service::{MovementQuery, MovementWindow},
    },
};

// POST /api/products/{id}/adjustments
// A validação do formulário acontece dentro do serviço, antes de qualquer escrita.
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<AdjustmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.inventory_service.adjust(product_id, payload).await?;

    let status = if outcome.replayed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(outcome)))
}

// GET /api/products/{id}/movements
// O histórico continua disponível mesmo depois que o produto é removido.
pub async fn list_product_movements(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .movement_service
        .list(&MovementQuery { product_id: Some(product_id), ..Default::default() })
        .await?;

    Ok((StatusCode::OK, Json(movements)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListParams {
    pub product_id: Option<i64>,
    #[serde(rename = "type")]
    pub movement_type: Option<MovementType>,
    pub window: Option<MovementWindow>,
    pub search: Option<String>,
}

// GET /api/stock-movements?productId=&type=IN&window=week&search=
pub async fn list_movements(
    State(app_state): State<AppState>,
    Query(params): Query<MovementListParams>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .movement_service
        .list(&MovementQuery {
            product_id: params.product_id,
            movement_type: params.movement_type,
            window: params.window,
            search: params.search,
        })
        .await?;

    Ok((StatusCode::OK, Json(movements)))
}

pub async fn get_movement(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let movement = app_state.movement_service.get(id).await?;
    Ok((StatusCode::OK, Json(movement)))
}

// Remoção administrativa: o saldo do produto não é revertido.
pub async fn delete_movement(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.movement_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
