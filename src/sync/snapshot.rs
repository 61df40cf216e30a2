use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetch succeeded and replaced the snapshot.
    Updated,
    /// The fetch failed; the previous snapshot is still in place.
    Kept,
    /// A newer refresh (or an invalidation) started while this one was in flight.
    Discarded,
}

/// Last successfully fetched value of a remote collection.
///
/// Every refresh takes a generation number when it starts. Its result is only
/// applied if no other refresh or invalidation started in the meantime, so the
/// most recently started fetch is the one that wins.
#[derive(Debug)]
pub struct Snapshot<T> {
    value: Mutex<Option<T>>,
    generation: AtomicU64,
}

impl<T: Clone> Snapshot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.lock().as_ref())
    }

    pub async fn refresh<F>(&self, label: &str, fetch: F) -> RefreshOutcome
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = fetch.await;

        let mut value = self.lock();
        if self.generation.load(Ordering::SeqCst) != ticket {
            log::debug!("Discarding superseded {} fetch #{}", label, ticket);
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(fresh) => {
                *value = Some(fresh);
                RefreshOutcome::Updated
            }
            Err(e) => {
                log::error!("Failed to refresh {}: {}", label, e);
                RefreshOutcome::Kept
            }
        }
    }

    /// Make any in-flight refresh a no-op, keeping the current value.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Invalidate and drop the current value.
    pub fn clear(&self) {
        self.invalidate();
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}
