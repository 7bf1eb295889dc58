// src/services/category_service.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::{field_error, AppError, StoreError},
    db::RecordStore,
    models::inventory::{Category, CategoryFilter, CategoryView, NewCategory, Product, ProductFilter},
};

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn RecordStore<Category>>,
    products: Arc<dyn RecordStore<Product>>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn RecordStore<Category>>, products: Arc<dyn RecordStore<Product>>) -> Self {
        Self { categories, products }
    }

    async fn product_count(&self, category_id: i64) -> Result<usize, AppError> {
        let products = self
            .products
            .list(&ProductFilter { category_id: Some(category_id) })
            .await
            .map_err(AppError::StoreRead)?;
        Ok(products.len())
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<CategoryView, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(field_error("name", "required", "O nome é obrigatório.").into());
        }

        let existing = self.categories.list(&CategoryFilter).await.map_err(AppError::StoreRead)?;
        if existing.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(AppError::CategoryNameAlreadyExists(name.to_string()));
        }

        let draft = NewCategory {
            name: name.to_string(),
            description: description.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string),
            created_at: Utc::now(),
        };

        let category = self.categories.create(draft).await.map_err(|e| match e {
            StoreError::Conflict(_) => AppError::CategoryNameAlreadyExists(name.to_string()),
            other => AppError::StoreWrite(other),
        })?;

        Ok(CategoryView { category, product_count: 0 })
    }

    // Busca no nome e na descrição; cada categoria vem com a contagem de produtos.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<CategoryView>, AppError> {
        let categories = self.categories.list(&CategoryFilter).await.map_err(AppError::StoreRead)?;
        let products = self.products.list(&ProductFilter::default()).await.map_err(AppError::StoreRead)?;

        let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);

        let mut views: Vec<CategoryView> = categories
            .into_iter()
            .filter(|c| {
                needle.as_deref().is_none_or(|n| {
                    c.name.to_lowercase().contains(n)
                        || c.description.as_deref().is_some_and(|d| d.to_lowercase().contains(n))
                })
            })
            .map(|category| {
                let product_count = products.iter().filter(|p| p.category_id == category.id).count();
                CategoryView { category, product_count }
            })
            .collect();

        views.sort_by(|a, b| a.category.name.to_lowercase().cmp(&b.category.name.to_lowercase()));
        Ok(views)
    }

    pub async fn get(&self, id: i64) -> Result<CategoryView, AppError> {
        let category = self
            .categories
            .get(id)
            .await
            .map_err(AppError::StoreRead)?
            .ok_or(AppError::CategoryNotFound(id))?;
        let product_count = self.product_count(id).await?;
        Ok(CategoryView { category, product_count })
    }

    /// Só remove categorias vazias.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.product_count(id).await? > 0 {
            return Err(AppError::CategoryInUse(id));
        }
        let removed = self.categories.delete(id).await.map_err(AppError::StoreWrite)?;
        if !removed {
            return Err(AppError::CategoryNotFound(id));
        }
        Ok(())
    }
}
