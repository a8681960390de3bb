pub mod dsn;
pub mod error;
pub mod layout;
pub mod object_store_storage;

use async_trait::async_trait;
use bytes::Bytes;
use common::{ExportRecord, TenantId};
use futures::stream::BoxStream;
use futures::TryStreamExt;

pub use dsn::create_object_store_from_dsn;
pub use error::StorageError;
pub use layout::ExportLayout;
pub use object_store_storage::ObjectStoreExportStorage;

/// Fixed name of the downloadable archive.
pub const ARCHIVE_FILE_NAME: &str = "data.tar";

/// Durable sink for export artifacts. The export core touches storage only
/// through this trait: `init` before the first write, `save` per record,
/// `archive_export_data` once on success, `clean_up_export_data` on eviction.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ExportStorage: Send + Sync {
    /// Prepare a fresh workspace for the tenant, deleting any prior artifacts.
    async fn init(&self, tenant_id: TenantId) -> Result<(), StorageError>;

    /// Append one wrapped record to the tenant workspace.
    async fn save(&self, tenant_id: TenantId, record: &ExportRecord) -> Result<(), StorageError>;

    /// Seal the workspace into the downloadable archive.
    async fn archive_export_data(&self, tenant_id: TenantId) -> Result<(), StorageError>;

    /// Stream the sealed archive.
    async fn download_export_data(
        &self,
        tenant_id: TenantId,
    ) -> Result<ExportArchive, StorageError>;

    /// Delete every artifact of the tenant, sealed or not.
    async fn clean_up_export_data(&self, tenant_id: TenantId) -> Result<(), StorageError>;
}

/// A sealed export archive ready for download.
pub struct ExportArchive {
    pub file_name: String,
    pub stream: BoxStream<'static, Result<Bytes, StorageError>>,
}

impl std::fmt::Debug for ExportArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportArchive")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl ExportArchive {
    pub fn new(stream: BoxStream<'static, Result<Bytes, StorageError>>) -> Self {
        Self {
            file_name: ARCHIVE_FILE_NAME.to_string(),
            stream,
        }
    }

    /// Header value for HTTP transports serving the archive.
    pub fn content_disposition(&self) -> String {
        format!("attachment;filename={}", self.file_name)
    }

    /// Collect the whole archive into memory.
    pub async fn into_bytes(self) -> Result<Bytes, StorageError> {
        let chunks: Vec<Bytes> = self.stream.try_collect().await?;
        Ok(chunks.concat().into())
    }
}
