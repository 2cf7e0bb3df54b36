//! Per-backend model cache: `model_id -> loaded_model`, loaded lazily on
//! first use or explicit warmup — spec.md §4.1.
//!
//! State machine per model is `absent -> loading -> ready`. The transition is
//! idempotent and concurrent callers requesting the same model block on the
//! same in-flight load rather than triggering redundant loads, via
//! [`tokio::sync::OnceCell`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Absent,
    Loading,
    Ready,
}

struct Entry<T> {
    cell: Arc<OnceCell<Arc<T>>>,
}

/// Lazily-populated cache of loaded models, keyed by model id.
pub struct ModelCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> Default for ModelCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ModelCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of a model, for reporting (e.g. `GET /models`, warmup
    /// responses). Does not trigger a load.
    pub async fn state(&self, model_id: &str) -> ModelState {
        let entries = self.entries.lock().await;
        match entries.get(model_id) {
            None => ModelState::Absent,
            Some(e) if e.cell.initialized() => ModelState::Ready,
            Some(_) => ModelState::Loading,
        }
    }

    /// Return the cached model, loading it via `loader` if absent. Concurrent
    /// callers for the same `model_id` await the same load.
    pub async fn get_or_load<F, Fut>(&self, model_id: &str, loader: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(model_id.to_string())
                .or_insert_with(|| Entry {
                    cell: Arc::new(OnceCell::new()),
                })
                .cell
                .clone()
        };

        let result = cell.get_or_try_init(|| async { loader().await.map(Arc::new) }).await?;
        Ok(result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_before_first_load() {
        let cache: ModelCache<u32> = ModelCache::new();
        assert_eq!(cache.state("kb-whisper-medium").await, ModelState::Absent);
    }

    #[tokio::test]
    async fn ready_after_load_and_stable_identity() {
        let cache: ModelCache<u32> = ModelCache::new();
        let a = cache.get_or_load("m", || async { Ok(42u32) }).await.unwrap();
        let b = cache.get_or_load("m", || async { Ok(99u32) }).await.unwrap();
        assert_eq!(*a, 42);
        assert_eq!(*b, 42);
        assert_eq!(cache.state("m").await, ModelState::Ready);
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_result() {
        let cache = Arc::new(ModelCache::<u32>::new());
        let counter = Arc::new(tokio::sync::Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("shared", || async move {
                        let mut c = counter.lock().await;
                        *c += 1;
                        Ok(*c)
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut results = Vec::new();
        for h in handles {
            results.push(*h.await.unwrap());
        }
        assert!(results.iter().all(|&r| r == results[0]));
        assert_eq!(*counter.lock().await, 1);
    }
}
