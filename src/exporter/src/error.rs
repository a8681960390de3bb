use std::time::Duration;

use common::{EntityId, TenantId};
use datasource::DataSourceError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Submission-time validation failure, returned before any async work.
    #[error("tenant {0} not found")]
    TenantNotFound(TenantId),
    /// A job for this tenant handle is still running.
    #[error("an export for tenant {0} is already in progress")]
    ExportInProgress(TenantId),
    #[error("export queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("export service is stopped")]
    ServiceStopped,
    /// Handle was never submitted, or its result has been evicted.
    #[error("export result for tenant {0} not found")]
    ResultNotFound(TenantId),
    #[error("export for tenant {0} is not done yet")]
    NotReady(TenantId),
    /// Download of a failed job; carries the stored error text.
    #[error("export for tenant {tenant_id} failed: {error}")]
    ExportFailed { tenant_id: TenantId, error: String },
    #[error("latest telemetry fetch for entity {0} timed out after {1:?}")]
    LatestTelemetryTimeout(EntityId, Duration),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Render an error with its full source chain, the text stored into a failed
/// result and surfaced on download.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
