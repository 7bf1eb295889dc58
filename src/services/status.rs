// src/services/status.rs

use crate::models::inventory::{Product, ProductView, StockStatus};

/// Situação do estoque a partir da quantidade e do ponto de reposição.
/// O limite é inclusivo: quantidade igual ao ponto de reposição já é estoque baixo.
pub fn classify(quantity: i64, reorder_point: i64) -> StockStatus {
    if quantity <= 0 {
        StockStatus::OutOfStock
    } else if quantity <= reorder_point {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

pub fn view(product: Product) -> ProductView {
    let status = classify(product.quantity, product.reorder_point);
    ProductView { product, status }
}
