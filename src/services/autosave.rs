// src/services/autosave.rs
//
// Autosave com debounce: várias edições dentro da janela viram uma gravação só,
// com o último valor. `cancel` é o "Esc" do usuário antes do timer disparar.

use std::{
    hash::Hash,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Destino da gravação quando o timer vence.
#[async_trait]
pub trait SaveSink<K, V>: Send + Sync {
    async fn save(&self, key: K, value: V);
}

struct PendingSave {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

pub struct Debouncer<K, V> {
    delay: Duration,
    generation: AtomicU64,
    pending: Arc<DashMap<K, PendingSave>>,
    sink: Arc<dyn SaveSink<K, V>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    pub fn new(delay: Duration, sink: Arc<dyn SaveSink<K, V>>) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            pending: Arc::new(DashMap::new()),
            sink,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Inicia o timer da chave, ou reinicia se já houver um pendente.
    pub fn schedule(&self, key: K, value: V) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // Reset: o timer anterior morre sem gravar
        if let Some((_, previous)) = self.pending.remove(&key) {
            if let Some(handle) = previous.handle {
                handle.abort();
            }
        }
        self.pending.insert(
            key.clone(),
            PendingSave {
                generation,
                handle: None,
            },
        );

        let pending = Arc::clone(&self.pending);
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Só grava se esta ainda for a geração vigente (não foi resetada nem cancelada)
            if pending
                .remove_if(&task_key, |_, entry| entry.generation == generation)
                .is_some()
            {
                sink.save(task_key, value).await;
            }
        });

        match self.pending.get_mut(&key) {
            Some(mut entry) if entry.generation == generation => entry.handle = Some(handle),
            _ => {}
        }
    }

    /// Cancela o timer pendente. Retorna `false` se não havia nada para cancelar.
    pub fn cancel(&self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some((_, entry)) => {
                if let Some(handle) = entry.handle {
                    handle.abort();
                }
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}
