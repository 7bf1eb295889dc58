pub mod status;
pub mod intake;
pub mod ledger;
pub mod reconciler;
pub mod request_keys;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod product_service;
pub use product_service::ProductService;
pub mod category_service;
pub use category_service::CategoryService;
pub mod movement_service;
pub use movement_service::MovementService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
