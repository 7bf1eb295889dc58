// src/config.rs

use crate::{
    common::clock::LedgerClock,
    db::{
        AdjustmentStore, CategoryRepository, MemoryStore, MovementRepository, ProductRepository, RecordStore,
        StockAdjustmentRepository,
    },
    models::inventory::{Category, Product, StockMovement},
    services::{
        inventory_service::OverRemovalPolicy, ledger::StockLedger, CategoryService, DashboardService,
        InventoryService, MovementService, ProductService,
    },
};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};

// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    // Sem DATABASE_URL o serviço roda com armazenamento em memória.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub over_removal: OverRemovalPolicy,
    pub adjustment_key_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            db_max_connections: 5,
            over_removal: OverRemovalPolicy::Clamp,
            adjustment_key_capacity: 1024,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{name} inválida ('{raw}'): {e}")),
        _ => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            over_removal: parse_var("STOCK_OVER_REMOVAL", defaults.over_removal)?,
            adjustment_key_capacity: parse_var("ADJUSTMENT_KEY_CAPACITY", defaults.adjustment_key_capacity)?,
        })
    }
}

// Os armazenamentos que o resto da aplicação usa.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn RecordStore<Product>>,
    pub movements: Arc<dyn RecordStore<StockMovement>>,
    pub categories: Arc<dyn RecordStore<Category>>,
    // Só o Postgres grava livro e saldo na mesma transação.
    pub adjustments: Option<Arc<dyn AdjustmentStore>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(MemoryStore::<Product>::new()),
            movements: Arc::new(MemoryStore::<StockMovement>::new()),
            categories: Arc::new(MemoryStore::<Category>::new()),
            adjustments: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub inventory_service: InventoryService,
    pub product_service: ProductService,
    pub category_service: CategoryService,
    pub movement_service: MovementService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        let stores = match settings.database_url.as_deref() {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Stores {
                    products: Arc::new(ProductRepository::new(db_pool.clone())),
                    movements: Arc::new(MovementRepository::new(db_pool.clone())),
                    categories: Arc::new(CategoryRepository::new(db_pool.clone())),
                    adjustments: Some(Arc::new(StockAdjustmentRepository::new(db_pool))),
                }
            }
            None => {
                tracing::warn!("DATABASE_URL não definida; usando armazenamento em memória.");
                Stores::in_memory()
            }
        };

        Ok(Self::with_stores(settings, stores))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_stores(settings: Settings, stores: Stores) -> Self {
        let ledger = StockLedger::new(stores.movements.clone(), Arc::new(LedgerClock::new()));

        let mut inventory_service = InventoryService::new(
            stores.products.clone(),
            ledger.clone(),
            settings.over_removal,
            settings.adjustment_key_capacity,
        );
        if let Some(adjustments) = stores.adjustments {
            inventory_service = inventory_service.with_adjustment_store(adjustments);
        }
        let product_service = ProductService::new(stores.products.clone(), stores.categories.clone());
        let category_service = CategoryService::new(stores.categories.clone(), stores.products.clone());
        let movement_service = MovementService::new(ledger.clone(), stores.products.clone());
        let dashboard_service = DashboardService::new(stores.products, stores.categories, ledger);

        Self {
            settings,
            inventory_service,
            product_service,
            category_service,
            movement_service,
            dashboard_service,
        }
    }
}
