use std::sync::Arc;

use tokio::sync::Mutex;

use crate::connector::RepositorySyncManager;
use crate::domain::{RepositoryRecord, RepositorySource, SyncOutcome};

/// Batch clone-or-sync without building an index.
pub struct SyncRepositoriesUseCase {
    sync_manager: Arc<Mutex<RepositorySyncManager>>,
}

impl SyncRepositoriesUseCase {
    pub fn new(sync_manager: Arc<Mutex<RepositorySyncManager>>) -> Self {
        Self { sync_manager }
    }

    pub async fn execute(&self, sources: &[RepositorySource]) -> Vec<SyncOutcome> {
        self.sync_manager.lock().await.sync_all(sources)
    }

    pub async fn record(&self, url: &str) -> Option<RepositoryRecord> {
        self.sync_manager.lock().await.record(url).cloned()
    }
}
