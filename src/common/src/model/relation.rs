use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Directed relation between two entities. Exports walk the `from` side only
/// so a relation is emitted exactly once even when both ends are traversed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelation {
    pub from: EntityId,
    pub to: EntityId,
    pub relation_type: String,
    pub type_group: String,
}
