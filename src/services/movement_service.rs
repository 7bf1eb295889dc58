// src/services/movement_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::inventory::{MovementFilter, MovementType, MovementView, Product, ProductFilter, StockMovement},
    services::ledger::StockLedger,
};

/// Janela de datas da tela de movimentações.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovementWindow {
    Today,
    Week,
    Month,
}

impl MovementWindow {
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            MovementWindow::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now),
            MovementWindow::Week => now - Duration::days(7),
            MovementWindow::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now - Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MovementQuery {
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
    pub window: Option<MovementWindow>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct MovementService {
    ledger: StockLedger,
    products: Arc<dyn RecordStore<Product>>,
}

impl MovementService {
    pub fn new(ledger: StockLedger, products: Arc<dyn RecordStore<Product>>) -> Self {
        Self { ledger, products }
    }

    // Junta nome e SKU do produto; produtos removidos ficam com None.
    async fn with_products(&self, movements: Vec<StockMovement>) -> Result<Vec<MovementView>, AppError> {
        let products: HashMap<i64, Product> = self
            .products
            .list(&ProductFilter::default())
            .await
            .map_err(AppError::StoreRead)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(movements
            .into_iter()
            .map(|movement| {
                let product = products.get(&movement.product_id);
                MovementView {
                    product_name: product.map(|p| p.name.clone()),
                    product_sku: product.map(|p| p.sku.clone()),
                    movement,
                }
            })
            .collect())
    }

    pub async fn list(&self, query: &MovementQuery) -> Result<Vec<MovementView>, AppError> {
        self.list_at(query, Utc::now()).await
    }

    pub(crate) async fn list_at(&self, query: &MovementQuery, now: DateTime<Utc>) -> Result<Vec<MovementView>, AppError> {
        let filter = MovementFilter {
            product_id: query.product_id,
            movement_type: query.movement_type,
            since: query.window.map(|w| w.since(now)),
        };
        let movements = self.ledger.list(&filter).await?;
        let views = self.with_products(movements).await?;

        let needle = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
        let Some(needle) = needle else {
            return Ok(views);
        };

        Ok(views
            .into_iter()
            .filter(|v| {
                v.movement.reason.to_lowercase().contains(&needle)
                    || v.product_name.as_deref().is_some_and(|n| n.to_lowercase().contains(&needle))
                    || v.product_sku.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<MovementView>, AppError> {
        let mut movements = self.ledger.list_all().await?;
        movements.truncate(limit);
        self.with_products(movements).await
    }

    pub async fn get(&self, id: i64) -> Result<MovementView, AppError> {
        let movement = self.ledger.get(id).await?;
        let product = self.products.get(movement.product_id).await.map_err(AppError::StoreRead)?;
        Ok(MovementView {
            product_name: product.as_ref().map(|p| p.name.clone()),
            product_sku: product.map(|p| p.sku),
            movement,
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.ledger.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::LedgerClock;
    use crate::db::{MemoryStore, Record};
    use crate::models::inventory::NewProduct;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn movement(id: i64, product_id: i64, movement_type: MovementType, reason: &str, timestamp: DateTime<Utc>) -> StockMovement {
        StockMovement { id, product_id, movement_type, quantity: 2, reason: reason.into(), notes: None, timestamp }
    }

    async fn service(now: DateTime<Utc>) -> MovementService {
        let products = Arc::new(MemoryStore::<Product>::new());
        products
            .insert(Product::from_draft(
                1,
                NewProduct {
                    name: "Cabo HDMI".into(),
                    sku: "CAB-HD".into(),
                    description: None,
                    quantity: 10,
                    reorder_point: 2,
                    unit_price: Decimal::new(3990, 2),
                    category_id: 1,
                    last_updated: now,
                },
            ))
            .await;

        let movements = Arc::new(MemoryStore::<StockMovement>::new());
        for m in [
            movement(1, 1, MovementType::In, "Restock", now - Duration::days(40)),
            movement(2, 1, MovementType::Out, "Sale", now - Duration::days(10)),
            movement(3, 1, MovementType::Out, "Damage", now - Duration::days(3)),
            movement(4, 7, MovementType::In, "Return", now - Duration::hours(1)),
        ] {
            movements.insert(m).await;
        }

        MovementService::new(StockLedger::new(movements, Arc::new(LedgerClock::new())), products)
    }

    fn ids(views: &[MovementView]) -> Vec<i64> {
        views.iter().map(|v| v.movement.id).collect()
    }

    #[tokio::test]
    async fn windows_restrict_by_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap();
        let svc = service(now).await;

        let all = svc.list_at(&MovementQuery::default(), now).await.unwrap();
        assert_eq!(ids(&all), vec![4, 3, 2, 1]);

        let today = svc.list_at(&MovementQuery { window: Some(MovementWindow::Today), ..Default::default() }, now).await.unwrap();
        assert_eq!(ids(&today), vec![4]);

        let week = svc.list_at(&MovementQuery { window: Some(MovementWindow::Week), ..Default::default() }, now).await.unwrap();
        assert_eq!(ids(&week), vec![4, 3]);

        let month = svc.list_at(&MovementQuery { window: Some(MovementWindow::Month), ..Default::default() }, now).await.unwrap();
        assert_eq!(ids(&month), vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn type_and_search_filters_and_product_join() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap();
        let svc = service(now).await;

        let outs = svc
            .list_at(&MovementQuery { movement_type: Some(MovementType::Out), ..Default::default() }, now)
            .await
            .unwrap();
        assert_eq!(ids(&outs), vec![3, 2]);
        assert_eq!(outs[0].product_name.as_deref(), Some("Cabo HDMI"));

        let by_sku = svc.list_at(&MovementQuery { search: Some("cab-hd".into()), ..Default::default() }, now).await.unwrap();
        assert_eq!(ids(&by_sku), vec![3, 2, 1]);

        let by_reason = svc.list_at(&MovementQuery { search: Some("RETURN".into()), ..Default::default() }, now).await.unwrap();
        assert_eq!(ids(&by_reason), vec![4]);
        assert_eq!(by_reason[0].product_name, None);
    }

    #[tokio::test]
    async fn recent_is_limited_and_newest_first() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap();
        let svc = service(now).await;
        assert_eq!(ids(&svc.recent(2).await.unwrap()), vec![4, 3]);
    }
}
