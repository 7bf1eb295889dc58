pub mod store;
pub use store::{AdjustmentStore, CommittedAdjustment, Record, RecordStore};
pub mod memory_store;
pub use memory_store::MemoryStore;
#[cfg(test)]
pub mod fault_store;
#[cfg(test)]
pub use fault_store::FaultyStore;
pub mod inventory_repo;
pub use inventory_repo::{CategoryRepository, MovementRepository, ProductRepository, StockAdjustmentRepository};
