// src/services/inventory_service.rs

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::{
    common::error::{field_error, AppError, StoreError},
    db::{AdjustmentStore, CommittedAdjustment, RecordStore},
    models::inventory::{MovementType, NewStockMovement, Product, ProductView, StockMovement, StockStatus, MAX_QUANTITY},
    services::{
        intake::{validate_adjustment, AdjustmentPayload},
        ledger::StockLedger,
        reconciler::{QuantityReconciler, ReconcileError},
        request_keys::{KeyGuard, RequestKeys},
        status,
    },
};

/// O que fazer quando uma saída pede mais do que o saldo em mãos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverRemovalPolicy {
    /// Grava a saída inteira no livro e zera o saldo.
    #[default]
    Clamp,
    /// Recusa com `InsufficientStock` antes de gravar qualquer coisa.
    Reject,
}

impl FromStr for OverRemovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(OverRemovalPolicy::Clamp),
            "reject" => Ok(OverRemovalPolicy::Reject),
            other => Err(format!("política de saída inválida: '{other}' (use clamp ou reject)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentOutcome {
    pub movement: StockMovement,
    pub product: ProductView,
    pub previous_status: StockStatus,
    pub clamped: bool,
    // true quando a resposta veio da memória de chaves, sem nova escrita.
    pub replayed: bool,
}

#[derive(Clone)]
pub struct InventoryService {
    products: Arc<dyn RecordStore<Product>>,
    ledger: StockLedger,
    reconciler: QuantityReconciler,
    // Presente quando o backend grava livro e saldo numa transação só.
    adjustments: Option<Arc<dyn AdjustmentStore>>,
    policy: OverRemovalPolicy,
    request_keys: Arc<RequestKeys<AdjustmentOutcome>>,
}

impl InventoryService {
    pub fn new(
        products: Arc<dyn RecordStore<Product>>,
        ledger: StockLedger,
        policy: OverRemovalPolicy,
        request_key_capacity: usize,
    ) -> Self {
        Self {
            reconciler: QuantityReconciler::new(products.clone()),
            products,
            ledger,
            adjustments: None,
            policy,
            request_keys: Arc::new(RequestKeys::new(request_key_capacity)),
        }
    }

    pub fn with_adjustment_store(mut self, adjustments: Arc<dyn AdjustmentStore>) -> Self {
        self.adjustments = Some(adjustments);
        self
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    // --- AJUSTE DE ESTOQUE ---
    // validar -> reservar chave -> conferir produto -> gravar no livro -> reconciliar saldo -> classificar.
    // Cada etapa que falha interrompe a cadeia; o que já foi gravado fica como está.
    pub async fn adjust(&self, product_id: i64, payload: AdjustmentPayload) -> Result<AdjustmentOutcome, AppError> {
        // 1. Validação (nenhuma escrita se falhar)
        let adjustment = validate_adjustment(product_id, payload)?;

        // Envios com a mesma chave esperam aqui até o primeiro terminar.
        let key_guard = match adjustment.request_key.as_deref() {
            Some(key) => self.request_keys.acquire(product_id, key).await,
            None => None,
        };
        if let Some(previous) = key_guard.as_ref().and_then(KeyGuard::outcome) {
            tracing::info!(product_id, "Ajuste repetido; devolvendo o resultado anterior.");
            return Ok(AdjustmentOutcome { replayed: true, ..previous });
        }

        // 2. Confere o produto antes de tocar no livro
        let product = self
            .products
            .get(product_id)
            .await
            .map_err(AppError::StoreRead)?
            .ok_or(AppError::ProductNotFound(product_id))?;

        match adjustment.movement_type {
            MovementType::Out if self.policy == OverRemovalPolicy::Reject && adjustment.quantity > product.quantity => {
                return Err(AppError::InsufficientStock {
                    available: product.quantity,
                    requested: adjustment.quantity,
                });
            }
            MovementType::In if product.quantity.checked_add(adjustment.quantity).is_none_or(|t| t > MAX_QUANTITY) => {
                return Err(field_error("quantity", "range", "O ajuste ultrapassa o saldo máximo permitido.").into());
            }
            _ => {}
        }

        let previous_status = status::classify(product.quantity, product.reorder_point);

        // 3 e 4. Livro + saldo
        let draft = self.ledger.draft(
            product_id,
            adjustment.movement_type,
            adjustment.quantity,
            &adjustment.reason,
            adjustment.notes.as_deref(),
        );
        let committed = match &self.adjustments {
            Some(store) => store
                .commit_adjustment(draft)
                .await
                .map_err(AppError::StoreWrite)?
                .ok_or(AppError::ProductNotFound(product_id))?,
            None => self.append_then_reconcile(draft).await?,
        };

        if committed.clamped {
            tracing::warn!(
                product_id,
                movement_id = committed.movement.id,
                available = committed.previous_quantity,
                requested = adjustment.quantity,
                "Saída maior que o saldo; quantidade zerada."
            );
        }

        // 5. Classifica o novo saldo
        let outcome = AdjustmentOutcome {
            movement: committed.movement,
            product: status::view(committed.product),
            previous_status,
            clamped: committed.clamped,
            replayed: false,
        };

        tracing::info!(
            product_id,
            movement_id = outcome.movement.id,
            quantity = outcome.product.product.quantity,
            "✅ Estoque ajustado"
        );

        if let Some(guard) = key_guard {
            guard.complete(outcome.clone());
        }

        Ok(outcome)
    }

    // Backends sem transação: grava no livro e depois reconcilia.
    // A movimentação já existe quando o saldo é escrito; uma falha ali é inconsistência.
    async fn append_then_reconcile(&self, draft: NewStockMovement) -> Result<CommittedAdjustment, AppError> {
        let product_id = draft.product_id;
        let delta = draft.movement_type.signed(draft.quantity);
        let movement = self.ledger.record(draft).await?;

        let reconciled = self.reconciler.apply(product_id, delta).await.map_err(|err| {
            let source = match err {
                ReconcileError::Read(e) | ReconcileError::Write(e) => e,
                ReconcileError::NotFound(id) => StoreError::Rejected(format!("produto {id} sumiu durante o ajuste")),
                ReconcileError::Overflow(id) => StoreError::Rejected(format!("saldo do produto {id} estouraria")),
            };
            tracing::error!(
                movement_id = movement.id,
                product_id,
                "🔥 Movimentação gravada mas saldo não atualizado: {}",
                source
            );
            AppError::ReconciliationFailed { movement_id: movement.id, product_id, source }
        })?;

        Ok(CommittedAdjustment {
            movement,
            product: reconciled.product,
            previous_quantity: reconciled.previous_quantity,
            clamped: reconciled.clamped,
        })
    }
}
