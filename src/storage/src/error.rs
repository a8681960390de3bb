use common::TenantId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("archive assembly failed: {0}")]
    Archive(#[from] std::io::Error),
    #[error("no export archive found for tenant {0}")]
    ArchiveNotFound(TenantId),
}
