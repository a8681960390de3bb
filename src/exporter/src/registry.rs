//! TTL registry of export results. Owns the lifecycle of export artifacts:
//! whichever way an entry leaves the registry (TTL expiry, explicit removal,
//! shutdown), storage cleanup runs for its tenant.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::TenantId;
use parking_lot::RwLock;
use storage::ExportStorage;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::result::TenantExportResult;

struct Entry {
    result: Arc<TenantExportResult>,
    last_access: Instant,
}

pub struct ResultRegistry {
    entries: RwLock<HashMap<TenantId, Entry>>,
    ttl: Duration,
    storage: Arc<dyn ExportStorage>,
}

impl ResultRegistry {
    pub fn new(ttl: Duration, storage: Arc<dyn ExportStorage>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            storage,
        }
    }

    /// Register a fresh result under the tenant handle. Rejected while a
    /// previous job for the same handle is still running; a finished entry is
    /// replaced (the new job's `init` supersedes its artifacts).
    pub fn register(&self, tenant_id: TenantId) -> Result<Arc<TenantExportResult>, ExportError> {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&tenant_id) {
            if !entry.result.is_done() {
                return Err(ExportError::ExportInProgress(tenant_id));
            }
        }
        let result = Arc::new(TenantExportResult::new());
        entries.insert(
            tenant_id,
            Entry {
                result: result.clone(),
                last_access: Instant::now(),
            },
        );
        Ok(result)
    }

    /// Whether the tenant has a registered result that has not reached a
    /// terminal state. Does not refresh the TTL.
    pub fn is_running(&self, tenant_id: TenantId) -> bool {
        self.entries
            .read()
            .get(&tenant_id)
            .is_some_and(|entry| !entry.result.is_done())
    }

    /// Look up a result, refreshing its TTL. The TTL is access-based: a
    /// polled or downloaded result stays reachable.
    pub fn get(&self, tenant_id: TenantId) -> Option<Arc<TenantExportResult>> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&tenant_id)?;
        entry.last_access = Instant::now();
        Some(entry.result.clone())
    }

    /// Explicitly drop an entry and clean up its artifacts.
    pub async fn remove(&self, tenant_id: TenantId) -> bool {
        let removed = self.entries.write().remove(&tenant_id).is_some();
        if removed {
            self.clean_up(tenant_id).await;
        }
        removed
    }

    /// Evict every entry whose TTL has elapsed, cleaning up artifacts once
    /// per evicted tenant.
    pub async fn sweep(&self) {
        let expired: Vec<TenantId> = {
            let mut entries = self.entries.write();
            let now = Instant::now();
            let expired: Vec<TenantId> = entries
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_access) >= self.ttl)
                .map(|(tenant_id, _)| *tenant_id)
                .collect();
            for tenant_id in &expired {
                entries.remove(tenant_id);
            }
            expired
        };

        for tenant_id in expired {
            debug!("[{tenant_id}] Evicting expired export result");
            self.clean_up(tenant_id).await;
        }
    }

    /// Drop everything, cleaning up each tenant. The shutdown path.
    pub async fn clear(&self) {
        let drained: Vec<TenantId> = {
            let mut entries = self.entries.write();
            entries.drain().map(|(tenant_id, _)| tenant_id).collect()
        };
        for tenant_id in drained {
            self.clean_up(tenant_id).await;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    async fn clean_up(&self, tenant_id: TenantId) {
        if let Err(e) = self.storage.clean_up_export_data(tenant_id).await {
            warn!("[{tenant_id}] Failed to clean up export data: {e}");
        }
    }
}
