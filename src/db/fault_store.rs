// src/db/fault_store.rs

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::{
    common::error::StoreError,
    db::store::{Record, RecordStore},
};

/// Envolve outro armazenamento e falha as operações ligadas, simulando um backend
/// que rejeita escritas ou está fora do ar.
pub struct FaultyStore<R: Record> {
    inner: Arc<dyn RecordStore<R>>,
    pub fail_reads: AtomicBool,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
}

impl<R: Record> FaultyStore<R> {
    pub fn new(inner: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
        }
    }

    // Cede a vez antes de cada operação, como um backend de rede faria.
    async fn check(flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op} desativado")));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for FaultyStore<R> {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, StoreError> {
        Self::check(&self.fail_reads, "list").await?;
        self.inner.list(filter).await
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        Self::check(&self.fail_reads, "get").await?;
        self.inner.get(id).await
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        Self::check(&self.fail_creates, "create").await?;
        self.inner.create(draft).await
    }

    async fn update(&self, id: i64, changes: R::Changes) -> Result<Option<R>, StoreError> {
        Self::check(&self.fail_updates, "update").await?;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        tokio::task::yield_now().await;
        self.inner.delete(id).await
    }
}
