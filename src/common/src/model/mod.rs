mod audit;
mod entity;
mod event;
mod kv;
mod relation;

pub use audit::{AuditLog, AUDIT_LOG_TABLE};
pub use entity::{
    Asset, AssetProfile, Customer, Dashboard, Device, DeviceProfile, Tenant, TenantEntity, User,
};
pub use event::{Event, EventType};
pub use kv::{AttributeKv, AttributeKvEntry, AttributeScope, KvValue, LatestTsKv, TsKvEntry};
pub use relation::EntityRelation;
