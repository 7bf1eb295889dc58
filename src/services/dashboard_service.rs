// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        dashboard::{CategoryBreakdownEntry, DashboardSummary, InventoryReport, TopProductEntry},
        inventory::{Category, CategoryFilter, MovementFilter, MovementType, Product, ProductFilter, StockStatus},
    },
    services::{movement_service::MovementService, ledger::StockLedger, status},
};

const RECENT_MOVEMENTS: usize = 5;
const TOP_PRODUCTS: usize = 10;

// Σ quantidade × preço; overflow vira erro em vez de pânico.
fn total_value<'a>(mut products: impl Iterator<Item = &'a Product>) -> Result<Decimal, AppError> {
    products.try_fold(Decimal::ZERO, |acc, p| {
        p.stock_value()
            .and_then(|value| acc.checked_add(value))
            .ok_or(AppError::ArithmeticOverflow("valor total do estoque"))
    })
}

fn checked_quantity_sum(mut quantities: impl Iterator<Item = i64>) -> Result<i64, AppError> {
    quantities.try_fold(0i64, |acc, q| acc.checked_add(q).ok_or(AppError::ArithmeticOverflow("soma de quantidades")))
}

#[derive(Clone)]
pub struct DashboardService {
    products: Arc<dyn RecordStore<Product>>,
    categories: Arc<dyn RecordStore<Category>>,
    ledger: StockLedger,
    movements: MovementService,
}

impl DashboardService {
    pub fn new(
        products: Arc<dyn RecordStore<Product>>,
        categories: Arc<dyn RecordStore<Category>>,
        ledger: StockLedger,
    ) -> Self {
        Self {
            movements: MovementService::new(ledger.clone(), products.clone()),
            products,
            categories,
            ledger,
        }
    }

    async fn all_products(&self) -> Result<Vec<Product>, AppError> {
        self.products.list(&ProductFilter::default()).await.map_err(AppError::StoreRead)
    }

    fn summarize(products: &[Product]) -> Result<(Decimal, Vec<Product>, usize), AppError> {
        let total_value = total_value(products.iter())?;
        let mut low: Vec<Product> = products
            .iter()
            .filter(|p| status::classify(p.quantity, p.reorder_point) == StockStatus::LowStock)
            .cloned()
            .collect();
        low.sort_by_key(|p| p.quantity);
        let out = products.iter().filter(|p| p.quantity <= 0).count();
        Ok((total_value, low, out))
    }

    // GET /api/reports/summary
    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let products = self.all_products().await?;
        self.summary_from(&products).await
    }

    async fn summary_from(&self, products: &[Product]) -> Result<DashboardSummary, AppError> {
        let (total_value, low_stock, out_of_stock_count) = Self::summarize(products)?;
        let recent_movements = self.movements.recent(RECENT_MOVEMENTS).await?;

        Ok(DashboardSummary {
            total_products: products.len(),
            total_value,
            low_stock_count: low_stock.len(),
            out_of_stock_count,
            low_stock_items: low_stock.into_iter().map(status::view).collect(),
            recent_movements,
        })
    }

    // GET /api/reports/inventory
    pub async fn get_inventory_report(&self) -> Result<InventoryReport, AppError> {
        self.inventory_report_at(Utc::now()).await
    }

    pub(crate) async fn inventory_report_at(&self, now: DateTime<Utc>) -> Result<InventoryReport, AppError> {
        let products = self.all_products().await?;
        let summary = self.summary_from(&products).await?;

        // Entradas e saídas dos últimos 7 dias
        let recent = self
            .ledger
            .list(&MovementFilter { since: Some(now - Duration::days(7)), ..Default::default() })
            .await?;
        let total_of = |t: MovementType| {
            checked_quantity_sum(recent.iter().filter(|m| m.movement_type == t).map(|m| m.quantity))
        };

        // Quebra por categoria (só categorias com produtos)
        let categories = self.categories.list(&CategoryFilter).await.map_err(AppError::StoreRead)?;
        let mut category_breakdown = Vec::new();
        for category in categories {
            let in_category: Vec<&Product> = products.iter().filter(|p| p.category_id == category.id).collect();
            if in_category.is_empty() {
                continue;
            }
            category_breakdown.push(CategoryBreakdownEntry {
                category_id: category.id,
                name: category.name,
                product_count: in_category.len(),
                total_quantity: checked_quantity_sum(in_category.iter().map(|p| p.quantity))?,
                total_value: total_value(in_category.iter().copied())?,
            });
        }

        // Curva de valor: top produtos por quantidade × preço
        let mut top_products = products
            .iter()
            .map(|p| {
                Ok(TopProductEntry {
                    product_id: p.id,
                    name: p.name.clone(),
                    sku: p.sku.clone(),
                    quantity: p.quantity,
                    unit_price: p.unit_price,
                    total_value: p.stock_value().ok_or(AppError::ArithmeticOverflow("valor do produto"))?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        top_products.sort_by(|a, b| b.total_value.cmp(&a.total_value).then_with(|| a.product_id.cmp(&b.product_id)));
        top_products.truncate(TOP_PRODUCTS);

        Ok(InventoryReport {
            summary,
            stock_in_last_7_days: total_of(MovementType::In)?,
            stock_out_last_7_days: total_of(MovementType::Out)?,
            category_breakdown,
            top_products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::LedgerClock;
    use crate::db::{MemoryStore, Record};
    use crate::models::inventory::{NewCategory, NewProduct, StockMovement};
    use chrono::TimeZone;

    fn product(id: i64, quantity: i64, reorder_point: i64, cents: i64, category_id: i64) -> Product {
        Product::from_draft(
            id,
            NewProduct {
                name: format!("Produto {id}"),
                sku: format!("P-{id}"),
                description: None,
                quantity,
                reorder_point,
                unit_price: Decimal::new(cents, 2),
                category_id,
                last_updated: Utc::now(),
            },
        )
    }

    async fn service(now: DateTime<Utc>) -> DashboardService {
        let products = Arc::new(MemoryStore::<Product>::new());
        for p in [
            product(1, 10, 5, 200, 1),  // 20.00, em estoque
            product(2, 3, 5, 1000, 1),  // 30.00, baixo
            product(3, 0, 5, 5000, 2),  // 0, sem estoque
            product(4, 5, 5, 100, 2),   // 5.00, baixo (limite inclusivo)
        ] {
            products.insert(p).await;
        }

        let categories = Arc::new(MemoryStore::<Category>::new());
        for name in ["Alimentos", "Higiene", "Vazia"] {
            categories.create(NewCategory { name: name.into(), description: None, created_at: now }).await.unwrap();
        }

        let movements = Arc::new(MemoryStore::<StockMovement>::new());
        for (id, t, q, days) in [
            (1, MovementType::In, 8, 2),
            (2, MovementType::Out, 3, 1),
            (3, MovementType::In, 100, 30),
            (4, MovementType::Out, 4, 6),
        ] {
            movements
                .insert(StockMovement {
                    id,
                    product_id: 1,
                    movement_type: t,
                    quantity: q,
                    reason: "Adjustment".into(),
                    notes: None,
                    timestamp: now - Duration::days(days),
                })
                .await;
        }

        DashboardService::new(products, categories, StockLedger::new(movements, Arc::new(LedgerClock::new())))
    }

    #[tokio::test]
    async fn summary_counts_value_and_low_stock() {
        let now = Utc::now();
        let summary = service(now).await.get_summary().await.unwrap();

        assert_eq!(summary.total_products, 4);
        assert_eq!(summary.total_value, Decimal::new(5500, 2));
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.out_of_stock_count, 1);
        let low_ids: Vec<i64> = summary.low_stock_items.iter().map(|v| v.product.id).collect();
        assert_eq!(low_ids, vec![2, 4]);
        assert_eq!(summary.recent_movements.len(), 4);
        assert_eq!(summary.recent_movements[0].movement.id, 2);
    }

    #[tokio::test]
    async fn overflowing_values_are_an_error_not_a_panic() {
        let now = Utc::now();
        let products = Arc::new(MemoryStore::<Product>::new());
        // Dados herdados de fora dos limites de cadastro.
        for id in [1, 2] {
            let mut p = product(id, 9_000_000_000_000_000_000, 0, 0, 1);
            p.unit_price = Decimal::from(100_000_000_000i64);
            products.insert(p).await;
        }
        let svc = DashboardService::new(
            products,
            Arc::new(MemoryStore::<Category>::new()),
            StockLedger::new(Arc::new(MemoryStore::<StockMovement>::new()), Arc::new(LedgerClock::new())),
        );

        assert!(matches!(svc.get_summary().await, Err(AppError::ArithmeticOverflow(_))));
        assert!(matches!(svc.inventory_report_at(now).await, Err(AppError::ArithmeticOverflow(_))));
        assert!(checked_quantity_sum([i64::MAX, 1].into_iter()).is_err());
    }

    #[tokio::test]
    async fn report_totals_last_week_breakdown_and_top_products() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let report = service(now).await.inventory_report_at(now).await.unwrap();

        assert_eq!(report.stock_in_last_7_days, 8);
        assert_eq!(report.stock_out_last_7_days, 7);

        assert_eq!(report.category_breakdown.len(), 2);
        let food = &report.category_breakdown[0];
        assert_eq!(food.name, "Alimentos");
        assert_eq!(food.product_count, 2);
        assert_eq!(food.total_quantity, 13);
        assert_eq!(food.total_value, Decimal::new(5000, 2));

        let top: Vec<i64> = report.top_products.iter().map(|t| t.product_id).collect();
        assert_eq!(top, vec![2, 1, 4, 3]);
    }
}
