// src/services/product_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::error::{field_error, AppError, StoreError},
    db::RecordStore,
    models::inventory::{
        unit_price_in_range, Category, CategoryFilter, NewProduct, Product, ProductChanges, ProductFilter,
        ProductView, StockStatus, MAX_QUANTITY,
    },
    services::status,
};

/// Dados de cadastro de um produto. A quantidade informada aqui é o saldo inicial.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub reorder_point: i64,
    pub unit_price: Decimal,
    pub category_id: i64,
}

/// Alteração de cadastro. Não existe `quantity`: saldo só muda por ajuste de estoque.
/// `description: Some(None)` (ou texto em branco) limpa a descrição.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<Option<String>>,
    pub reorder_point: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub status: Option<StockStatus>,
    pub category_id: Option<i64>,
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn RecordStore<Product>>,
    categories: Arc<dyn RecordStore<Category>>,
}

fn non_blank(value: &str, field: &'static str, message: &'static str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(field_error(field, "required", message).into());
    }
    Ok(trimmed.to_string())
}

fn check_reorder_point(reorder_point: i64) -> Result<(), AppError> {
    if !(0..=MAX_QUANTITY).contains(&reorder_point) {
        return Err(field_error("reorderPoint", "range", "O ponto de reposição deve estar entre 0 e o limite permitido.").into());
    }
    Ok(())
}

fn check_unit_price(unit_price: Decimal) -> Result<(), AppError> {
    if !unit_price_in_range(unit_price) {
        return Err(field_error("unitPrice", "range", "O preço deve estar entre 0 e o limite permitido.").into());
    }
    Ok(())
}

impl ProductService {
    pub fn new(products: Arc<dyn RecordStore<Product>>, categories: Arc<dyn RecordStore<Category>>) -> Self {
        Self { products, categories }
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), AppError> {
        let exists = self.categories.get(category_id).await.map_err(AppError::StoreRead)?.is_some();
        if !exists {
            return Err(field_error("categoryId", "not_found", "Categoria inexistente.").into());
        }
        Ok(())
    }

    // SKU é único sem diferenciar maiúsculas; `except` ignora o próprio produto numa edição.
    async fn ensure_unique_sku(&self, sku: &str, except: Option<i64>) -> Result<(), AppError> {
        let taken = self
            .products
            .list(&ProductFilter::default())
            .await
            .map_err(AppError::StoreRead)?
            .iter()
            .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id) != except);
        if taken {
            return Err(AppError::SkuAlreadyExists(sku.to_string()));
        }
        Ok(())
    }

    fn map_write(err: StoreError, sku: &str) -> AppError {
        match err {
            StoreError::Conflict(_) => AppError::SkuAlreadyExists(sku.to_string()),
            other => AppError::StoreWrite(other),
        }
    }

    // --- CREATE PRODUCT ---
    pub async fn create(&self, input: ProductInput) -> Result<ProductView, AppError> {
        let name = non_blank(&input.name, "name", "O nome é obrigatório.")?;
        let sku = non_blank(&input.sku, "sku", "O SKU é obrigatório.")?;
        if !(0..=MAX_QUANTITY).contains(&input.quantity) {
            return Err(field_error("quantity", "range", "A quantidade deve estar entre 0 e o limite permitido.").into());
        }
        check_reorder_point(input.reorder_point)?;
        check_unit_price(input.unit_price)?;

        self.ensure_category(input.category_id).await?;
        self.ensure_unique_sku(&sku, None).await?;

        let draft = NewProduct {
            name,
            sku: sku.clone(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            quantity: input.quantity,
            reorder_point: input.reorder_point,
            unit_price: input.unit_price,
            category_id: input.category_id,
            last_updated: Utc::now(),
        };

        let product = self.products.create(draft).await.map_err(|e| Self::map_write(e, &sku))?;
        tracing::info!(product_id = product.id, sku = %product.sku, "Produto cadastrado");
        Ok(status::view(product))
    }

    // --- LIST PRODUCTS ---
    // Busca por nome, SKU ou nome da categoria; filtros de situação e categoria. Ordem alfabética.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<ProductView>, AppError> {
        let products = self
            .products
            .list(&ProductFilter { category_id: query.category_id })
            .await
            .map_err(AppError::StoreRead)?;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let category_names: HashMap<i64, String> = if search.is_some() {
            self.categories
                .list(&CategoryFilter)
                .await
                .map_err(AppError::StoreRead)?
                .into_iter()
                .map(|c| (c.id, c.name.to_lowercase()))
                .collect()
        } else {
            HashMap::new()
        };

        let mut views: Vec<ProductView> = products
            .into_iter()
            .filter(|p| {
                search.as_deref().is_none_or(|needle| {
                    p.name.to_lowercase().contains(needle)
                        || p.sku.to_lowercase().contains(needle)
                        || category_names.get(&p.category_id).is_some_and(|c| c.contains(needle))
                })
            })
            .map(status::view)
            .filter(|v| query.status.is_none_or(|s| s == v.status))
            .collect();

        views.sort_by(|a, b| {
            a.product.name.to_lowercase().cmp(&b.product.name.to_lowercase())
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        Ok(views)
    }

    pub async fn get(&self, id: i64) -> Result<ProductView, AppError> {
        self.products
            .get(id)
            .await
            .map_err(AppError::StoreRead)?
            .map(status::view)
            .ok_or(AppError::ProductNotFound(id))
    }

    // --- UPDATE PRODUCT ---
    pub async fn update(&self, id: i64, update: ProductUpdate) -> Result<ProductView, AppError> {
        let current = self.get(id).await?.product;

        let name = update.name.as_deref().map(|n| non_blank(n, "name", "O nome é obrigatório.")).transpose()?;
        let sku = update.sku.as_deref().map(|s| non_blank(s, "sku", "O SKU é obrigatório.")).transpose()?;

        if let Some(reorder_point) = update.reorder_point {
            check_reorder_point(reorder_point)?;
        }
        if let Some(unit_price) = update.unit_price {
            check_unit_price(unit_price)?;
        }
        if let Some(category_id) = update.category_id {
            self.ensure_category(category_id).await?;
        }
        if let Some(sku) = sku.as_deref() {
            self.ensure_unique_sku(sku, Some(id)).await?;
        }

        let changes = ProductChanges {
            name,
            sku: sku.clone(),
            description: update.description.map(|d| d.filter(|d| !d.trim().is_empty())),
            quantity: None,
            reorder_point: update.reorder_point,
            unit_price: update.unit_price,
            category_id: update.category_id,
            last_updated: Some(Utc::now()),
        };

        let sku_for_error = sku.unwrap_or(current.sku);
        self.products
            .update(id, changes)
            .await
            .map_err(|e| Self::map_write(e, &sku_for_error))?
            .map(status::view)
            .ok_or(AppError::ProductNotFound(id))
    }

    // O histórico de movimentações do produto é mantido.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let removed = self.products.delete(id).await.map_err(AppError::StoreWrite)?;
        if !removed {
            return Err(AppError::ProductNotFound(id));
        }
        tracing::info!(product_id = id, "Produto removido");
        Ok(())
    }
}
