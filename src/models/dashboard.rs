// src/models/dashboard.rs

use serde::Serialize;
use rust_decimal::Decimal;

use crate::models::inventory::{MovementView, ProductView};

// 1. Resumo (Os Cards do Topo)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_value: Decimal,       // Soma de quantidade × preço
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub low_stock_items: Vec<ProductView>,
    pub recent_movements: Vec<MovementView>,
}

// 2. Quebra por categoria
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownEntry {
    pub category_id: i64,
    pub name: String,
    pub product_count: usize,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

// 3. Top produtos por valor em estoque
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_value: Decimal,
}

// 4. Relatório completo
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: DashboardSummary,
    pub stock_in_last_7_days: i64,
    pub stock_out_last_7_days: i64,
    pub category_breakdown: Vec<CategoryBreakdownEntry>,
    pub top_products: Vec<TopProductEntry>,
}
