// src/services/reconciler.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::{AppError, StoreError},
    db::RecordStore,
    models::inventory::{Product, ProductChanges},
};

/// Resultado de aplicar um delta ao saldo de um produto.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub product: Product,
    pub previous_quantity: i64,
    // O delta pedia mais do que havia; o saldo parou em zero.
    pub clamped: bool,
}

/// Mantém `Product.quantity` em dia com o livro-razão.
#[derive(Clone)]
pub struct QuantityReconciler {
    products: Arc<dyn RecordStore<Product>>,
}

impl QuantityReconciler {
    pub fn new(products: Arc<dyn RecordStore<Product>>) -> Self {
        Self { products }
    }

    /// Lê o saldo atual, soma o delta (nunca abaixo de zero) e grava junto com `last_updated`.
    ///
    /// Leitura e escrita não são atômicas: dois ajustes simultâneos no mesmo produto
    /// podem perder uma atualização.
    pub async fn apply(&self, product_id: i64, signed_delta: i64) -> Result<Reconciled, ReconcileError> {
        let current = self
            .products
            .get(product_id)
            .await
            .map_err(ReconcileError::Read)?
            .ok_or(ReconcileError::NotFound(product_id))?;

        let target = current
            .quantity
            .checked_add(signed_delta)
            .ok_or(ReconcileError::Overflow(product_id))?;
        let new_quantity = target.max(0);

        let changes = ProductChanges {
            quantity: Some(new_quantity),
            last_updated: Some(Utc::now()),
            ..Default::default()
        };

        let product = self
            .products
            .update(product_id, changes)
            .await
            .map_err(ReconcileError::Write)?
            .ok_or(ReconcileError::NotFound(product_id))?;

        Ok(Reconciled {
            product,
            previous_quantity: current.quantity,
            clamped: target < 0,
        })
    }
}

// Erro do reconciliador; quem orquestra decide como apresentar (antes ou depois do livro).
#[derive(Debug)]
pub enum ReconcileError {
    NotFound(i64),
    // Saldo + delta não cabe em i64.
    Overflow(i64),
    Read(StoreError),
    Write(StoreError),
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::NotFound(id) => AppError::ProductNotFound(id),
            ReconcileError::Overflow(_) => AppError::ArithmeticOverflow("saldo do produto"),
            ReconcileError::Read(e) => AppError::StoreRead(e),
            ReconcileError::Write(e) => AppError::StoreWrite(e),
        }
    }
}
