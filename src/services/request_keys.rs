// src/services/request_keys.rs

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot<T> = Arc<AsyncMutex<Option<T>>>;

/// Memória limitada de chaves de requisição, por produto.
///
/// Cada chave tem um slot próprio. Quem pega o slot primeiro segura o lock até
/// terminar o ajuste; envios repetidos com a mesma chave esperam e recebem o
/// resultado gravado. Se o primeiro falhar, o slot fica vazio e o próximo executa.
/// Ao passar da capacidade, a chave mais antiga é esquecida. Capacidade zero desliga.
pub struct RequestKeys<T> {
    capacity: usize,
    inner: Mutex<KeyTable<T>>,
}

struct KeyTable<T> {
    order: VecDeque<(i64, String)>,
    slots: HashMap<(i64, String), Slot<T>>,
}

/// Posse exclusiva de uma chave enquanto o ajuste roda.
pub struct KeyGuard<T> {
    slot: OwnedMutexGuard<Option<T>>,
}

impl<T: Clone> KeyGuard<T> {
    /// Resultado de um envio anterior com a mesma chave, se houver.
    pub fn outcome(&self) -> Option<T> {
        self.slot.clone()
    }

    pub fn complete(mut self, outcome: T) {
        *self.slot = Some(outcome);
    }
}

impl<T: Clone> RequestKeys<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(KeyTable { order: VecDeque::new(), slots: HashMap::new() }),
        }
    }

    fn slot(&self, product_id: i64, key: &str) -> Slot<T> {
        let mut table = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = (product_id, key.to_string());
        if let Some(slot) = table.slots.get(&entry) {
            return slot.clone();
        }

        let slot: Slot<T> = Arc::new(AsyncMutex::new(None));
        table.slots.insert(entry.clone(), slot.clone());
        table.order.push_back(entry);
        while table.order.len() > self.capacity {
            if let Some(oldest) = table.order.pop_front() {
                table.slots.remove(&oldest);
            }
        }
        slot
    }

    /// Reserva a chave. Espera enquanto outro envio com a mesma chave está em andamento.
    /// `None` quando a memória está desligada.
    pub async fn acquire(&self, product_id: i64, key: &str) -> Option<KeyGuard<T>> {
        if self.capacity == 0 {
            return None;
        }
        let slot = self.slot(product_id, key);
        Some(KeyGuard { slot: slot.lock_owned().await })
    }
}
