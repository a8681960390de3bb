use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::model::TenantEntity;
use crate::object_type::ObjectType;

/// A record paired with its object type, the unit handed to the storage
/// adapter. Carrying the tag explicitly preserves the category through the
/// dynamic dispatch of the traversal loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub object_type: ObjectType,
    pub data: serde_json::Value,
}

impl ExportRecord {
    pub fn wrap<T: Serialize>(
        object_type: ObjectType,
        entity: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            object_type,
            data: serde_json::to_value(entity)?,
        })
    }
}

/// Dynamic page item produced by the per-category entity queries. Entities
/// without an id (none of the current categories, but the contract allows it)
/// are exported without a sub-export cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_id: Option<EntityId>,
    pub payload: serde_json::Value,
}

impl EntityRecord {
    pub fn from_entity<T>(entity: &T) -> Result<Self, serde_json::Error>
    where
        T: TenantEntity + Serialize,
    {
        Ok(Self {
            entity_id: Some(entity.entity_id()),
            payload: serde_json::to_value(entity)?,
        })
    }
}
