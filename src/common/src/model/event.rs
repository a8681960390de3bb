use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::TenantId;

/// Event categories, each stored in its own time-partitioned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Lifecycle,
    Error,
    Stats,
}

impl EventType {
    pub const VALUES: [EventType; 3] = [EventType::Lifecycle, EventType::Error, EventType::Stats];

    /// Name of the partitioned table holding this event type.
    pub fn table(&self) -> &'static str {
        match self {
            EventType::Lifecycle => "lc_event",
            EventType::Error => "error_event",
            EventType::Stats => "stats_event",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub entity_id: Uuid,
    pub event_type: EventType,
    pub ts: i64,
    pub body: serde_json::Value,
}
