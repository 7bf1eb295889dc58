// src/handlers/categories.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

// ---
// Payload: CreateCategory
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório (até 100 caracteres)."))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .category_service
        .create(&payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    pub search: Option<String>,
}

pub async fn list_categories(
    State(app_state): State<AppState>,
    Query(params): Query<CategoryListParams>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.category_service.list(params.search.as_deref()).await?;
    Ok((StatusCode::OK, Json(categories)))
}

pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.category_service.get(id).await?;
    Ok((StatusCode::OK, Json(category)))
}

pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
