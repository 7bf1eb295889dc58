// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::StoreError,
    db::store::{AdjustmentStore, CommittedAdjustment, RecordStore},
    models::inventory::{
        Category, CategoryChanges, CategoryFilter, MovementChanges, MovementFilter, NewCategory,
        NewProduct, NewStockMovement, Product, ProductChanges, ProductFilter, StockMovement,
    },
};

// ---
// Produtos
// ---

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Product> for ProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        if let Some(category_id) = filter.category_id {
            query.push(" WHERE category_id = ").push_bind(category_id);
        }
        query.push(" ORDER BY name ASC");

        query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create(&self, draft: NewProduct) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, sku, description, quantity, reorder_point, unit_price, category_id, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(draft.name)
            .bind(draft.sku)
            .bind(draft.description)
            .bind(draft.quantity)
            .bind(draft.reorder_point)
            .bind(draft.unit_price)
            .bind(draft.category_id)
            .bind(draft.last_updated)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// UPDATE parcial: só as colunas presentes em `changes` entram no SET.
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE products SET ");
        let mut touched = false;
        {
            let mut set = query.separated(", ");
            if let Some(name) = changes.name {
                set.push("name = ").push_bind_unseparated(name);
                touched = true;
            }
            if let Some(sku) = changes.sku {
                set.push("sku = ").push_bind_unseparated(sku);
                touched = true;
            }
            if let Some(description) = changes.description {
                set.push("description = ").push_bind_unseparated(description);
                touched = true;
            }
            if let Some(quantity) = changes.quantity {
                set.push("quantity = ").push_bind_unseparated(quantity);
                touched = true;
            }
            if let Some(reorder_point) = changes.reorder_point {
                set.push("reorder_point = ").push_bind_unseparated(reorder_point);
                touched = true;
            }
            if let Some(unit_price) = changes.unit_price {
                set.push("unit_price = ").push_bind_unseparated(unit_price);
                touched = true;
            }
            if let Some(category_id) = changes.category_id {
                set.push("category_id = ").push_bind_unseparated(category_id);
                touched = true;
            }
            if let Some(last_updated) = changes.last_updated {
                set.push("last_updated = ").push_bind_unseparated(last_updated);
                touched = true;
            }
        }

        if !touched {
            return self.get(id).await;
        }

        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
        query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

// ---
// Movimentações (livro-razão)
// ---

#[derive(Clone)]
pub struct MovementRepository {
    pool: PgPool,
}

impl MovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<StockMovement> for MovementRepository {
    async fn list(&self, filter: &MovementFilter) -> Result<Vec<StockMovement>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM stock_movements WHERE TRUE");
        if let Some(product_id) = filter.product_id {
            query.push(" AND product_id = ").push_bind(product_id);
        }
        if let Some(movement_type) = filter.movement_type {
            query.push(r#" AND "type" = "#).push_bind(movement_type);
        }
        if let Some(since) = filter.since {
            query.push(r#" AND "timestamp" >= "#).push_bind(since);
        }
        query.push(r#" ORDER BY "timestamp" DESC, id DESC"#);

        query
            .build_query_as::<StockMovement>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get(&self, id: i64) -> Result<Option<StockMovement>, StoreError> {
        sqlx::query_as::<_, StockMovement>("SELECT * FROM stock_movements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create(&self, draft: NewStockMovement) -> Result<StockMovement, StoreError> {
        sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, "type", quantity, reason, notes, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(draft.product_id)
            .bind(draft.movement_type)
            .bind(draft.quantity)
            .bind(draft.reason)
            .bind(draft.notes)
            .bind(draft.timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    // Movimentações são imutáveis: "alterar" só devolve o registro atual.
    async fn update(&self, id: i64, _changes: MovementChanges) -> Result<Option<StockMovement>, StoreError> {
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

// ---
// Categorias
// ---

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<Category> for CategoryRepository {
    async fn list(&self, _filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, StoreError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create(&self, draft: NewCategory) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(draft.name)
            .bind(draft.description)
            .bind(draft.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update(&self, id: i64, _changes: CategoryChanges) -> Result<Option<Category>, StoreError> {
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

// ---
// Ajuste de estoque transacional
// ---

#[derive(Clone)]
pub struct StockAdjustmentRepository {
    pool: PgPool,
}

impl StockAdjustmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdjustmentStore for StockAdjustmentRepository {
    async fn commit_adjustment(&self, draft: NewStockMovement) -> Result<Option<CommittedAdjustment>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        // 1. Trava a linha do produto até o commit
        let previous: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1 FOR UPDATE")
            .bind(draft.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let Some(previous_quantity) = previous else {
            tx.rollback().await.map_err(StoreError::from_sqlx)?;
            return Ok(None);
        };

        let delta = draft.movement_type.signed(draft.quantity);
        let Some(target) = previous_quantity.checked_add(delta) else {
            tx.rollback().await.map_err(StoreError::from_sqlx)?;
            return Err(StoreError::Rejected(format!("saldo do produto {} estouraria", draft.product_id)));
        };

        // 2. Grava Histórico
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, "type", quantity, reason, notes, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(draft.product_id)
            .bind(draft.movement_type)
            .bind(draft.quantity)
            .bind(&draft.reason)
            .bind(&draft.notes)
            .bind(draft.timestamp)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        // 3. Atualiza o saldo pelo delta, sem descer de zero
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET quantity = GREATEST(0, quantity + $2), last_updated = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(draft.product_id)
            .bind(delta)
            .bind(draft.timestamp)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(Some(CommittedAdjustment {
            movement,
            product,
            previous_quantity,
            clamped: target < 0,
        }))
    }
}
