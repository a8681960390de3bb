use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Typed key-value payload shared by attributes and telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KvValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Str(String),
    Json(serde_json::Value),
}

/// Attribute scopes, exported in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeScope {
    Client,
    Server,
    Shared,
}

impl AttributeScope {
    pub const VALUES: [AttributeScope; 3] = [
        AttributeScope::Client,
        AttributeScope::Server,
        AttributeScope::Shared,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeKvEntry {
    pub key: String,
    pub value: KvValue,
    pub last_update_ts: i64,
}

/// One exported attribute entry, tagged with the owning entity and scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeKv {
    pub entity_id: EntityId,
    pub scope: AttributeScope,
    pub entry: AttributeKvEntry,
}

impl AttributeKv {
    pub fn new(entity_id: EntityId, scope: AttributeScope, entry: AttributeKvEntry) -> Self {
        Self {
            entity_id,
            scope,
            entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsKvEntry {
    pub key: String,
    pub value: KvValue,
    pub ts: i64,
}

/// Latest telemetry value for one key of one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestTsKv {
    pub entity_id: EntityId,
    pub entry: TsKvEntry,
}

impl LatestTsKv {
    pub fn new(entity_id: EntityId, entry: TsKvEntry) -> Self {
        Self { entity_id, entry }
    }
}
