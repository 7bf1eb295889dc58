pub mod products;
pub mod stock;
pub mod categories;
pub mod reports;
