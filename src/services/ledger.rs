// src/services/ledger.rs

use std::sync::Arc;

use crate::{
    common::{clock::LedgerClock, error::AppError},
    db::RecordStore,
    models::inventory::{MovementFilter, MovementType, NewStockMovement, StockMovement},
};

/// Livro-razão de movimentações: só acrescenta, nunca altera.
#[derive(Clone)]
pub struct StockLedger {
    movements: Arc<dyn RecordStore<StockMovement>>,
    clock: Arc<LedgerClock>,
}

// Mais recente primeiro; o id desempata timestamps iguais vindos de fora deste processo.
fn newest_first(movements: &mut [StockMovement]) {
    movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

impl StockLedger {
    pub fn new(movements: Arc<dyn RecordStore<StockMovement>>, clock: Arc<LedgerClock>) -> Self {
        Self { movements, clock }
    }

    /// Monta o rascunho com o próximo timestamp do relógio do livro.
    pub fn draft(
        &self,
        product_id: i64,
        movement_type: MovementType,
        quantity: i64,
        reason: &str,
        notes: Option<&str>,
    ) -> NewStockMovement {
        NewStockMovement {
            product_id,
            movement_type,
            quantity,
            reason: reason.to_string(),
            notes: notes.map(str::to_string),
            timestamp: self.clock.now(),
        }
    }

    /// Grava uma movimentação. Se o armazenamento rejeitar, nada fica visível
    /// e o erro volta como `StoreWrite`.
    pub async fn append(
        &self,
        product_id: i64,
        movement_type: MovementType,
        quantity: i64,
        reason: &str,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        self.record(self.draft(product_id, movement_type, quantity, reason, notes)).await
    }

    pub async fn record(&self, draft: NewStockMovement) -> Result<StockMovement, AppError> {
        self.movements.create(draft).await.map_err(AppError::StoreWrite)
    }

    pub async fn list_by_product(&self, product_id: i64) -> Result<Vec<StockMovement>, AppError> {
        self.list(&MovementFilter { product_id: Some(product_id), ..Default::default() })
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<StockMovement>, AppError> {
        self.list(&MovementFilter::default()).await
    }

    pub async fn list(&self, filter: &MovementFilter) -> Result<Vec<StockMovement>, AppError> {
        let mut movements = self.movements.list(filter).await.map_err(AppError::StoreRead)?;
        newest_first(&mut movements);
        Ok(movements)
    }

    pub async fn get(&self, id: i64) -> Result<StockMovement, AppError> {
        self.movements
            .get(id)
            .await
            .map_err(AppError::StoreRead)?
            .ok_or(AppError::MovementNotFound(id))
    }

    /// Remoção administrativa. O saldo do produto NÃO é revertido.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let removed = self.movements.delete(id).await.map_err(AppError::StoreWrite)?;
        if !removed {
            return Err(AppError::MovementNotFound(id));
        }
        tracing::warn!(movement_id = id, "Movimentação removida manualmente; saldo do produto mantido.");
        Ok(())
    }
}
