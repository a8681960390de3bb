//! Data-access interfaces consumed by the export engine. Each trait covers
//! one query shape; concrete backends register one `TenantEntityDao` per
//! entity category so new categories are additive.

use async_trait::async_trait;
use common::model::{
    AttributeKvEntry, AttributeScope, AuditLog, EntityRelation, Event, EventType, Tenant, TsKvEntry,
};
use common::{EntityId, EntityRecord, ObjectType, PageData, PageLink, TenantId, TimePageLink};
use uuid::Uuid;

use crate::error::DataSourceError;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait TenantDao: Send + Sync {
    async fn find_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, DataSourceError>;
}

/// Paginated access to one entity category of a tenant.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait TenantEntityDao: Send + Sync {
    fn object_type(&self) -> ObjectType;

    async fn find_all_by_tenant_id(
        &self,
        tenant_id: TenantId,
        link: PageLink,
    ) -> Result<PageData<EntityRecord>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait RelationDao: Send + Sync {
    /// Relations with the given entity as source. The target side is covered
    /// when the target entity is traversed.
    async fn find_all_by_from(
        &self,
        tenant_id: TenantId,
        from: EntityId,
    ) -> Result<Vec<EntityRelation>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AttributesDao: Send + Sync {
    async fn find_all(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        scope: AttributeScope,
    ) -> Result<Vec<AttributeKvEntry>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait TimeseriesLatestDao: Send + Sync {
    /// Latest value per telemetry key. Backends may resolve this lazily; the
    /// exporter bounds the wait with a timeout.
    async fn find_all_latest(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
    ) -> Result<Vec<TsKvEntry>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait EventDao: Send + Sync {
    async fn find_events(
        &self,
        tenant_id: TenantId,
        entity_id: Uuid,
        event_type: EventType,
        link: TimePageLink,
    ) -> Result<PageData<Event>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AuditLogDao: Send + Sync {
    async fn find_audit_logs_by_tenant_id(
        &self,
        tenant_id: TenantId,
        link: TimePageLink,
    ) -> Result<PageData<AuditLog>, DataSourceError>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PartitionsDao: Send + Sync {
    /// Start times (epoch millis) of the partitions recorded for a table.
    /// Distinct by construction on the backend side.
    async fn fetch_partitions(&self, table: &str) -> Result<Vec<i64>, DataSourceError>;
}
