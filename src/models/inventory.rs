// src/models/inventory.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Categorias não são editadas, só criadas ou removidas.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges;

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter;

// --- 2. Produtos ---
// `quantity` é o saldo em mãos. Só o reconciliador escreve nele depois da criação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub reorder_point: i64,
    pub unit_price: Decimal,
    pub category_id: i64,
    pub last_updated: DateTime<Utc>,
}

// Limites de cadastro e de ajuste; mantêm saldo e valor longe do overflow.
pub const MAX_QUANTITY: i64 = 1_000_000_000_000;
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

pub fn unit_price_in_range(price: Decimal) -> bool {
    !price.is_sign_negative() && price <= Decimal::from(MAX_UNIT_PRICE)
}

impl Product {
    /// Valor do estoque em mãos (quantidade × preço unitário). `None` em overflow.
    pub fn stock_value(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub reorder_point: i64,
    pub unit_price: Decimal,
    pub category_id: i64,
    pub last_updated: DateTime<Utc>,
}

// Campos `None` não são tocados.
// `description: Some(None)` limpa a descrição.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub reorder_point: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub category_id: Option<i64>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
}

// --- 3. Situação do estoque ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

// Produto + situação calculada, o formato que as telas consomem.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub status: StockStatus,
}

// --- 4. Movimentações de Estoque (livro-razão) ---

// Mapeia o CREATE TYPE stock_movement_type do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "stock_movement_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    /// Efeito assinado de uma movimentação com essa magnitude.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }
}

// O livro guarda a magnitude (> 0); a direção vem do `movement_type`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StockMovement {
    pub fn signed_quantity(&self) -> i64 {
        self.movement_type.signed(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// Movimentações são imutáveis: não existe alteração.
#[derive(Debug, Clone, Default)]
pub struct MovementChanges;

#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
    pub since: Option<DateTime<Utc>>,
}

// Movimentação + dados do produto para a listagem geral.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
}

// Categoria + contagem de produtos para a listagem.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}
