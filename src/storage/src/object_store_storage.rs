//! Object-store backed export storage. Records are buffered per object type
//! and flushed as JSONL segments; archiving merges the segments into a single
//! tar with one `{object_type}.jsonl` entry per category.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use common::{ExportRecord, ObjectType, TenantId};
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::layout::ExportLayout;
use crate::{ExportArchive, ExportStorage};

/// Default segment flush threshold in bytes.
const FLUSH_THRESHOLD_BYTES: usize = 4 * 1024 * 1024;

#[derive(Default)]
struct TypeBuffer {
    buf: Vec<u8>,
    segments: u32,
}

pub struct ObjectStoreExportStorage {
    object_store: Arc<dyn ObjectStore>,
    layout: ExportLayout,
    flush_threshold: usize,
    buffers: Mutex<HashMap<TenantId, HashMap<ObjectType, TypeBuffer>>>,
}

impl ObjectStoreExportStorage {
    pub fn new(object_store: Arc<dyn ObjectStore>, layout: ExportLayout) -> Self {
        Self {
            object_store,
            layout,
            flush_threshold: FLUSH_THRESHOLD_BYTES,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Lower the segment flush threshold, mainly to exercise multi-segment
    /// assembly in tests.
    pub fn with_flush_threshold(mut self, bytes: usize) -> Self {
        self.flush_threshold = bytes;
        self
    }

    async fn delete_prefix(&self, prefix: &ObjectPath) -> Result<(), StorageError> {
        let mut listing = self.object_store.list(Some(prefix));
        while let Some(meta) = listing.try_next().await? {
            self.object_store.delete(&meta.location).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ExportStorage for ObjectStoreExportStorage {
    async fn init(&self, tenant_id: TenantId) -> Result<(), StorageError> {
        self.buffers.lock().await.insert(tenant_id, HashMap::new());
        self.delete_prefix(&self.layout.tenant_prefix(tenant_id))
            .await?;
        debug!("[{tenant_id}] Initialized export workspace");
        Ok(())
    }

    async fn save(&self, tenant_id: TenantId, record: &ExportRecord) -> Result<(), StorageError> {
        let line = serde_json::to_vec(record)?;

        let mut buffers = self.buffers.lock().await;
        let buffer = buffers
            .entry(tenant_id)
            .or_default()
            .entry(record.object_type)
            .or_default();
        buffer.buf.extend_from_slice(&line);
        buffer.buf.push(b'\n');

        if buffer.buf.len() >= self.flush_threshold {
            let seq = buffer.segments;
            let data = std::mem::take(&mut buffer.buf);
            buffer.segments += 1;
            let path = self.layout.segment_path(tenant_id, record.object_type, seq);
            debug!(
                "[{tenant_id}] Flushing {} byte segment to {path}",
                data.len()
            );
            self.object_store.put(&path, data.into()).await?;
        }
        Ok(())
    }

    async fn archive_export_data(&self, tenant_id: TenantId) -> Result<(), StorageError> {
        let tenant_buffers = self
            .buffers
            .lock()
            .await
            .remove(&tenant_id)
            .unwrap_or_default();

        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut builder = tar::Builder::new(Vec::new());
        let mut segment_paths = Vec::new();
        let mut entries = 0usize;

        for object_type in ObjectType::VALUES {
            let Some(buffer) = tenant_buffers.get(&object_type) else {
                continue;
            };

            let mut content = Vec::new();
            for seq in 0..buffer.segments {
                let path = self.layout.segment_path(tenant_id, object_type, seq);
                let segment = self.object_store.get(&path).await?.bytes().await?;
                content.extend_from_slice(&segment);
                segment_paths.push(path);
            }
            content.extend_from_slice(&buffer.buf);

            if content.is_empty() {
                continue;
            }

            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(mtime);
            header.set_cksum();
            builder.append_data(
                &mut header,
                format!("{}.jsonl", object_type.name()),
                content.as_slice(),
            )?;
            entries += 1;
        }

        let archive = builder.into_inner()?;
        let size = archive.len();
        let path = self.layout.archive_path(tenant_id);
        self.object_store.put(&path, archive.into()).await?;

        for segment in &segment_paths {
            self.object_store.delete(segment).await?;
        }

        info!("[{tenant_id}] Archived export data: {entries} files, {size} bytes");
        Ok(())
    }

    async fn download_export_data(
        &self,
        tenant_id: TenantId,
    ) -> Result<ExportArchive, StorageError> {
        let path = self.layout.archive_path(tenant_id);
        let result = match self.object_store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::ArchiveNotFound(tenant_id));
            }
            Err(e) => return Err(e.into()),
        };
        let stream = result.into_stream().map_err(StorageError::from);
        Ok(ExportArchive::new(Box::pin(stream)))
    }

    async fn clean_up_export_data(&self, tenant_id: TenantId) -> Result<(), StorageError> {
        self.buffers.lock().await.remove(&tenant_id);
        self.delete_prefix(&self.layout.tenant_prefix(tenant_id))
            .await?;
        debug!("[{tenant_id}] Cleaned up export data");
        Ok(())
    }
}
