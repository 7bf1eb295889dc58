// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::{
    common::error::{field_error, AppError},
    config::AppState,
    models::inventory::StockStatus,
    services::product_service::{ProductInput, ProductQuery, ProductUpdate},
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    pub description: Option<String>,

    // Saldo inicial. Depois do cadastro só muda por ajuste.
    #[serde(default)]
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub quantity: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "O ponto de reposição não pode ser negativo."))]
    pub reorder_point: i64,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,

    #[validate(required(message = "O campo 'categoryId' é obrigatório."))]
    pub category_id: Option<i64>,
}

pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let Some(category_id) = payload.category_id else {
        return Err(field_error("categoryId", "required", "O campo 'categoryId' é obrigatório.").into());
    };

    let product = app_state
        .product_service
        .create(ProductInput {
            name: payload.name,
            sku: payload.sku,
            description: payload.description,
            quantity: payload.quantity,
            reorder_point: payload.reorder_point,
            unit_price: payload.unit_price,
            category_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub search: Option<String>,
    pub status: Option<StockStatus>,
    pub category_id: Option<i64>,
}

// GET /api/products?search=&status=low-stock&categoryId=
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .product_service
        .list(&ProductQuery {
            search: params.search,
            status: params.status,
            category_id: params.category_id,
        })
        .await?;

    Ok((StatusCode::OK, Json(products)))
}

pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// Campo ausente -> None; presente (mesmo null) -> Some(..).
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ---
// Payload: UpdateProduct (parcial)
// ---
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub name: Option<String>,
    pub sku: Option<String>,

    // null ou "" limpam a descrição.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub reorder_point: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub category_id: Option<i64>,

    // Só existe para ser recusado: saldo não se edita pelo cadastro.
    pub quantity: Option<serde_json::Value>,
}

pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.quantity.is_some() {
        return Err(field_error(
            "quantity",
            "read_only",
            "A quantidade só pode ser alterada por um ajuste de estoque.",
        )
        .into());
    }

    let product = app_state
        .product_service
        .update(
            id,
            ProductUpdate {
                name: payload.name,
                sku: payload.sku,
                description: payload.description,
                reorder_point: payload.reorder_point,
                unit_price: payload.unit_price,
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
