// src/db/store.rs

use async_trait::async_trait;

use crate::{
    common::error::StoreError,
    models::inventory::{
        Category, CategoryChanges, CategoryFilter, MovementChanges, MovementFilter, NewCategory,
        NewProduct, NewStockMovement, Product, ProductChanges, ProductFilter, StockMovement,
    },
};

/// Um tipo de registro persistido, com os formatos de criação, alteração e filtro
/// que o armazenamento aceita para ele.
pub trait Record: Clone + Send + Sync + 'static {
    type Draft: Send + Sync + 'static;
    type Changes: Send + Sync + 'static;
    type Filter: Default + Send + Sync + 'static;

    fn id(&self) -> i64;

    /// Materializa o registro a partir do rascunho, com o id atribuído pelo armazenamento.
    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn apply(&mut self, changes: Self::Changes);

    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Armazenamento de registros de um tipo. `get`/`update` devolvem `None` quando o id não existe
/// e `delete` devolve `false`.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError>;

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    async fn update(&self, id: i64, changes: R::Changes) -> Result<Option<R>, StoreError>;

    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// Movimentação gravada e saldo já atualizado, vindos de uma única transação.
#[derive(Debug, Clone)]
pub struct CommittedAdjustment {
    pub movement: StockMovement,
    pub product: Product,
    pub previous_quantity: i64,
    pub clamped: bool,
}

/// Backends transacionais gravam o livro e o saldo juntos: ou os dois, ou nenhum.
#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    /// `None` quando o produto não existe; nesse caso nada é gravado.
    async fn commit_adjustment(&self, draft: NewStockMovement) -> Result<Option<CommittedAdjustment>, StoreError>;
}

// ---
// Mapeamento tipado de cada entidade
// ---

impl Record for Product {
    type Draft = NewProduct;
    type Changes = ProductChanges;
    type Filter = ProductFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewProduct) -> Self {
        Product {
            id,
            name: draft.name,
            sku: draft.sku,
            description: draft.description,
            quantity: draft.quantity,
            reorder_point: draft.reorder_point,
            unit_price: draft.unit_price,
            category_id: draft.category_id,
            last_updated: draft.last_updated,
        }
    }

    fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(sku) = changes.sku {
            self.sku = sku;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
        if let Some(reorder_point) = changes.reorder_point {
            self.reorder_point = reorder_point;
        }
        if let Some(unit_price) = changes.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(last_updated) = changes.last_updated {
            self.last_updated = last_updated;
        }
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        filter.category_id.is_none_or(|id| id == self.category_id)
    }
}

impl Record for StockMovement {
    type Draft = NewStockMovement;
    type Changes = MovementChanges;
    type Filter = MovementFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewStockMovement) -> Self {
        StockMovement {
            id,
            product_id: draft.product_id,
            movement_type: draft.movement_type,
            quantity: draft.quantity,
            reason: draft.reason,
            notes: draft.notes,
            timestamp: draft.timestamp,
        }
    }

    fn apply(&mut self, _changes: MovementChanges) {}

    fn matches(&self, filter: &MovementFilter) -> bool {
        filter.product_id.is_none_or(|id| id == self.product_id)
            && filter.movement_type.is_none_or(|t| t == self.movement_type)
            && filter.since.is_none_or(|since| self.timestamp >= since)
    }
}

impl Record for Category {
    type Draft = NewCategory;
    type Changes = CategoryChanges;
    type Filter = CategoryFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewCategory) -> Self {
        Category {
            id,
            name: draft.name,
            description: draft.description,
            created_at: draft.created_at,
        }
    }

    fn apply(&mut self, _changes: CategoryChanges) {}

    fn matches(&self, _filter: &CategoryFilter) -> bool {
        true
    }
}
