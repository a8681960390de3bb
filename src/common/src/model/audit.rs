use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{EntityId, TenantId};

/// Time-partitioned table holding audit log records.
pub const AUDIT_LOG_TABLE: &str = "audit_log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub entity_id: Option<EntityId>,
    pub user_name: String,
    pub action_type: String,
    pub created_time: i64,
}
