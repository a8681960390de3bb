use common::{ObjectType, TenantId};
use object_store::path::Path as ObjectPath;

/// Path scheme for export artifacts inside the object store:
/// `{prefix}/{tenant}/data/{object_type}/part-NNNNNN.jsonl` for record
/// segments, `{prefix}/{tenant}/data.tar` for the sealed archive.
#[derive(Clone)]
pub struct ExportLayout {
    prefix: String,
}

impl ExportLayout {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn tenant_prefix(&self, tenant_id: TenantId) -> ObjectPath {
        ObjectPath::from(format!("{}/{}", self.prefix, tenant_id))
    }

    pub fn segment_path(
        &self,
        tenant_id: TenantId,
        object_type: ObjectType,
        seq: u32,
    ) -> ObjectPath {
        ObjectPath::from(format!(
            "{}/{}/data/{}/part-{:06}.jsonl",
            self.prefix,
            tenant_id,
            object_type.name(),
            seq
        ))
    }

    pub fn archive_path(&self, tenant_id: TenantId) -> ObjectPath {
        ObjectPath::from(format!("{}/{}/data.tar", self.prefix, tenant_id))
    }
}
