// src/routes.rs

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppState, handlers};

pub fn build_router(app_state: AppState) -> Router {
    let product_routes = Router::new()
        .route("/api/products"
               ,post(handlers::products::create_product)
               .get(handlers::products::list_products)
        )
        .route("/api/products/{id}"
               ,get(handlers::products::get_product)
               .patch(handlers::products::update_product)
               .delete(handlers::products::delete_product)
        )
        .route("/api/products/{id}/adjustments", post(handlers::stock::adjust_stock))
        .route("/api/products/{id}/movements", get(handlers::stock::list_product_movements));

    let movement_routes = Router::new()
        .route("/api/stock-movements", get(handlers::stock::list_movements))
        .route("/api/stock-movements/{id}"
               ,get(handlers::stock::get_movement)
               .delete(handlers::stock::delete_movement)
        );

    let category_routes = Router::new()
        .route("/api/categories"
               ,post(handlers::categories::create_category)
               .get(handlers::categories::list_categories)
        )
        .route("/api/categories/{id}"
               ,get(handlers::categories::get_category)
               .delete(handlers::categories::delete_category)
        );

    let report_routes = Router::new()
        .route("/api/reports/summary", get(handlers::reports::get_summary))
        .route("/api/reports/inventory", get(handlers::reports::get_inventory_report));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(product_routes)
        .merge(movement_routes)
        .merge(category_routes)
        .merge(report_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
