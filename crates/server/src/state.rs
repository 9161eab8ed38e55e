#![forbid(unsafe_code)]

use crate::error::ApiError;
use parking_lot::Mutex;
use std::sync::Arc;
use tb_core::profile::SchemaProfile;
use tb_storage::{SqliteStore, StoreError};

/// Shared handle to the store, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    profile: SchemaProfile,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        let profile = store.profile();
        Self {
            store: Arc::new(Mutex::new(store)),
            profile,
        }
    }

    pub fn profile(&self) -> SchemaProfile {
        self.profile
    }

    /// Runs one store operation on the blocking pool. The lock is held only inside `op`,
    /// so operations from concurrent requests never interleave.
    pub(crate) async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut SqliteStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock();
            op(&mut guard)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?;
        outcome.map_err(ApiError::from)
    }
}
