// src/db/memory_store.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    common::error::StoreError,
    db::store::{Record, RecordStore},
};

// Armazenamento em memória: o padrão quando não há DATABASE_URL, e a base dos testes.
pub struct MemoryStore<R: Record> {
    inner: RwLock<MemoryTable<R>>,
}

struct MemoryTable<R> {
    next_id: i64,
    rows: BTreeMap<i64, R>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryTable { next_id: 1, rows: BTreeMap::new() }),
        }
    }

    /// Insere um registro já pronto, preservando o id. Usado para carregar dados de teste.
    pub async fn insert(&self, record: R) {
        let mut table = self.inner.write().await;
        table.next_id = table.next_id.max(record.id() + 1);
        table.rows.insert(record.id(), record);
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError> {
        let table = self.inner.read().await;
        Ok(table.rows.values().filter(|r| r.matches(filter)).cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        let mut table = self.inner.write().await;
        let id = table.next_id;
        table.next_id += 1;
        let record = R::from_draft(id, draft);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, changes: R::Changes) -> Result<Option<R>, StoreError> {
        let mut table = self.inner.write().await;
        Ok(table.rows.get_mut(&id).map(|record| {
            record.apply(changes);
            record.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}
