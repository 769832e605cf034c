//! Per-screen load slots. A newer load cancels the one it supersedes, and
//! results from superseded loads are discarded instead of overwriting newer
//! state.

use api_core::{ApiClient, ApiError, CancellationToken};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::DropGuard;

/// Lifetime of one screen. Dropping it cancels every request started
/// under it.
pub struct ViewScope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl ViewScope {
    pub fn new() -> Self {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        Self {
            token,
            _guard: guard,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A client whose requests are cancelled with this scope.
    pub fn client(&self, api: &ApiClient) -> ApiClient {
        api.scoped(self.token.child_token())
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

struct Slot<K, T> {
    generation: u64,
    in_flight: Option<CancellationToken>,
    key: Option<K>,
    record: Option<T>,
}

/// Holds the record a screen is showing, keyed by its identifier.
pub struct RecordView<K, T> {
    api: ApiClient,
    scope: CancellationToken,
    slot: Arc<Mutex<Slot<K, T>>>,
}

impl<K, T> Clone for RecordView<K, T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            scope: self.scope.clone(),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<K: Clone, T: Clone> RecordView<K, T> {
    pub fn new(scope: &ViewScope, api: &ApiClient) -> Self {
        Self {
            api: api.clone(),
            scope: scope.token().clone(),
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                in_flight: None,
                key: None,
                record: None,
            })),
        }
    }

    /// Loads the record for `key` with `fetch`, cancelling any load still in
    /// flight. Returns [`ApiError::Cancelled`] when this load was itself
    /// superseded or its scope closed; the stored record is then left as
    /// the newer load set it.
    pub async fn load<F, Fut>(&self, key: K, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let (generation, cancel) = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = slot.in_flight.take() {
                previous.cancel();
            }
            slot.generation += 1;
            let cancel = self.scope.child_token();
            slot.in_flight = Some(cancel.clone());
            slot.key = Some(key);
            (slot.generation, cancel)
        };

        let result = fetch(self.api.scoped(cancel)).await;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation {
            tracing::debug!(generation, current = slot.generation, "Discarding superseded load");
            return Err(ApiError::Cancelled);
        }
        slot.in_flight = None;
        let record = result?;
        slot.record = Some(record.clone());
        Ok(record)
    }

    pub fn current(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record
            .clone()
    }

    /// Identifier of the most recent load, finished or not.
    pub fn key(&self) -> Option<K> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .key
            .clone()
    }
}
