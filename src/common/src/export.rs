use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::id::TenantId;
use crate::object_type::ObjectType;

/// Request for one tenant export job. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantExportConfig {
    pub tenant_id: TenantId,
    /// Entity categories to leave out of the export, on top of the engine's
    /// default skip set.
    #[serde(default)]
    pub skipped: HashSet<ObjectType>,
}

impl TenantExportConfig {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            skipped: HashSet::new(),
        }
    }

    pub fn skip(mut self, object_type: ObjectType) -> Self {
        self.skipped.insert(object_type);
        self
    }
}
