//! Fixture-backed implementation of every dao trait, used by tests and the
//! demo binary. Insertion order is preserved so paginated traversals are
//! deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::model::{
    AttributeKvEntry, AttributeScope, AuditLog, EntityRelation, Event, EventType, Tenant,
    TenantEntity, TsKvEntry,
};
use common::page::paginate;
use common::{
    EntityId, EntityRecord, ObjectType, PageData, PageLink, TenantId, TimePageLink,
};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::dao::{
    AttributesDao, AuditLogDao, EventDao, PartitionsDao, RelationDao, TenantDao, TenantEntityDao,
    TimeseriesLatestDao,
};
use crate::error::DataSourceError;
use crate::registry::{DataSources, EntityDaoRegistry};

/// Entity categories served by the generic per-category dao. The remaining
/// categories are produced by the dedicated sub-export queries.
const ENTITY_TYPES: [ObjectType; 7] = [
    ObjectType::Customer,
    ObjectType::User,
    ObjectType::DeviceProfile,
    ObjectType::Device,
    ObjectType::AssetProfile,
    ObjectType::Asset,
    ObjectType::Dashboard,
];

#[derive(Default)]
struct Store {
    tenants: Vec<Tenant>,
    entities: HashMap<(TenantId, ObjectType), Vec<EntityRecord>>,
    relations: Vec<(TenantId, EntityRelation)>,
    attributes: Vec<(TenantId, EntityId, AttributeScope, AttributeKvEntry)>,
    latest: Vec<(TenantId, EntityId, TsKvEntry)>,
    events: Vec<Event>,
    audit_logs: Vec<AuditLog>,
    partitions: HashMap<String, Vec<i64>>,
}

#[derive(Default)]
pub struct InMemoryDataSource {
    store: RwLock<Store>,
}

impl InMemoryDataSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.store.write().tenants.push(tenant);
    }

    pub fn add_entity<T>(&self, tenant_id: TenantId, entity: &T) -> Result<(), DataSourceError>
    where
        T: TenantEntity + Serialize,
    {
        let record = EntityRecord::from_entity(entity)
            .map_err(|e| DataSourceError::Query(e.to_string()))?;
        self.store
            .write()
            .entities
            .entry((tenant_id, T::OBJECT_TYPE))
            .or_default()
            .push(record);
        Ok(())
    }

    pub fn add_relation(&self, tenant_id: TenantId, relation: EntityRelation) {
        self.store.write().relations.push((tenant_id, relation));
    }

    pub fn add_attribute(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        scope: AttributeScope,
        entry: AttributeKvEntry,
    ) {
        self.store
            .write()
            .attributes
            .push((tenant_id, entity_id, scope, entry));
    }

    pub fn add_latest(&self, tenant_id: TenantId, entity_id: EntityId, entry: TsKvEntry) {
        self.store.write().latest.push((tenant_id, entity_id, entry));
    }

    pub fn add_event(&self, event: Event) {
        self.store.write().events.push(event);
    }

    pub fn add_audit_log(&self, audit_log: AuditLog) {
        self.store.write().audit_logs.push(audit_log);
    }

    pub fn set_partitions(&self, table: &str, start_times: Vec<i64>) {
        self.store
            .write()
            .partitions
            .insert(table.to_string(), start_times);
    }

    /// Bundle this fixture as a full set of data sources, with one entity dao
    /// registered per entity category.
    pub fn data_sources(self: &Arc<Self>) -> DataSources {
        let mut builder = EntityDaoRegistry::builder();
        for object_type in ENTITY_TYPES {
            builder = builder.register(Arc::new(InMemoryEntityDao {
                source: self.clone(),
                object_type,
            }));
        }
        DataSources {
            tenants: self.clone(),
            entities: Arc::new(builder.build()),
            relations: self.clone(),
            attributes: self.clone(),
            ts_latest: self.clone(),
            events: self.clone(),
            audit_logs: self.clone(),
            partitions: self.clone(),
        }
    }
}

struct InMemoryEntityDao {
    source: Arc<InMemoryDataSource>,
    object_type: ObjectType,
}

#[async_trait]
impl TenantEntityDao for InMemoryEntityDao {
    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    async fn find_all_by_tenant_id(
        &self,
        tenant_id: TenantId,
        link: PageLink,
    ) -> Result<PageData<EntityRecord>, DataSourceError> {
        let store = self.source.store.read();
        let records = store
            .entities
            .get(&(tenant_id, self.object_type))
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(paginate(records, &link))
    }
}

#[async_trait]
impl TenantDao for InMemoryDataSource {
    async fn find_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, DataSourceError> {
        let store = self.store.read();
        Ok(store.tenants.iter().find(|t| t.id == tenant_id).cloned())
    }
}

#[async_trait]
impl RelationDao for InMemoryDataSource {
    async fn find_all_by_from(
        &self,
        tenant_id: TenantId,
        from: EntityId,
    ) -> Result<Vec<EntityRelation>, DataSourceError> {
        let store = self.store.read();
        Ok(store
            .relations
            .iter()
            .filter(|(t, r)| *t == tenant_id && r.from == from)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[async_trait]
impl AttributesDao for InMemoryDataSource {
    async fn find_all(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        scope: AttributeScope,
    ) -> Result<Vec<AttributeKvEntry>, DataSourceError> {
        let store = self.store.read();
        Ok(store
            .attributes
            .iter()
            .filter(|(t, e, s, _)| *t == tenant_id && *e == entity_id && *s == scope)
            .map(|(_, _, _, entry)| entry.clone())
            .collect())
    }
}

#[async_trait]
impl TimeseriesLatestDao for InMemoryDataSource {
    async fn find_all_latest(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
    ) -> Result<Vec<TsKvEntry>, DataSourceError> {
        let store = self.store.read();
        Ok(store
            .latest
            .iter()
            .filter(|(t, e, _)| *t == tenant_id && *e == entity_id)
            .map(|(_, _, entry)| entry.clone())
            .collect())
    }
}

#[async_trait]
impl EventDao for InMemoryDataSource {
    async fn find_events(
        &self,
        tenant_id: TenantId,
        entity_id: Uuid,
        event_type: EventType,
        link: TimePageLink,
    ) -> Result<PageData<Event>, DataSourceError> {
        let store = self.store.read();
        let matching: Vec<Event> = store
            .events
            .iter()
            .filter(|e| {
                e.tenant_id == tenant_id
                    && e.entity_id == entity_id
                    && e.event_type == event_type
                    && link.contains(e.ts)
            })
            .cloned()
            .collect();
        Ok(paginate(&matching, &link.page_link))
    }
}

#[async_trait]
impl AuditLogDao for InMemoryDataSource {
    async fn find_audit_logs_by_tenant_id(
        &self,
        tenant_id: TenantId,
        link: TimePageLink,
    ) -> Result<PageData<AuditLog>, DataSourceError> {
        let store = self.store.read();
        let matching: Vec<AuditLog> = store
            .audit_logs
            .iter()
            .filter(|a| a.tenant_id == tenant_id && link.contains(a.created_time))
            .cloned()
            .collect();
        Ok(paginate(&matching, &link.page_link))
    }
}

#[async_trait]
impl PartitionsDao for InMemoryDataSource {
    async fn fetch_partitions(&self, table: &str) -> Result<Vec<i64>, DataSourceError> {
        let store = self.store.read();
        Ok(store.partitions.get(table).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::{Device, KvValue};

    fn device(tenant_id: TenantId, name: &str) -> Device {
        Device {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
            device_profile_id: Uuid::new_v4(),
            label: String::new(),
            created_time: 0,
        }
    }

    #[tokio::test]
    async fn entity_pages_preserve_insertion_order() {
        let source = InMemoryDataSource::new();
        let tenant_id = TenantId::random();
        for i in 0..5 {
            source
                .add_entity(tenant_id, &device(tenant_id, &format!("d{i}")))
                .unwrap();
        }

        let sources = source.data_sources();
        let dao = sources.entities.get(ObjectType::Device).unwrap();

        let first = dao
            .find_all_by_tenant_id(tenant_id, PageLink::new(2))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_next);
        assert_eq!(first.items[0].payload["name"], "d0");

        let last = dao
            .find_all_by_tenant_id(tenant_id, PageLink::new(2).next().next())
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_next);
    }

    #[tokio::test]
    async fn events_filtered_by_window_and_type() {
        let source = InMemoryDataSource::new();
        let tenant_id = TenantId::random();
        let entity = Uuid::new_v4();
        for ts in [100, 150, 250] {
            source.add_event(Event {
                id: Uuid::new_v4(),
                tenant_id,
                entity_id: entity,
                event_type: EventType::Lifecycle,
                ts,
                body: serde_json::json!({}),
            });
        }
        source.add_event(Event {
            id: Uuid::new_v4(),
            tenant_id,
            entity_id: entity,
            event_type: EventType::Error,
            ts: 120,
            body: serde_json::json!({}),
        });

        let link = TimePageLink::new(PageLink::new(512), 100, 199);
        let page = source
            .find_events(tenant_id, entity, EventType::Lifecycle, link)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn latest_telemetry_joins_on_entity() {
        let source = InMemoryDataSource::new();
        let tenant_id = TenantId::random();
        let entity = EntityId::new(ObjectType::Device, Uuid::new_v4());
        let other = EntityId::new(ObjectType::Device, Uuid::new_v4());
        source.add_latest(
            tenant_id,
            entity,
            TsKvEntry {
                key: "temperature".into(),
                value: KvValue::Double(21.5),
                ts: 1000,
            },
        );
        source.add_latest(
            tenant_id,
            other,
            TsKvEntry {
                key: "temperature".into(),
                value: KvValue::Double(19.0),
                ts: 1000,
            },
        );

        let latest = source.find_all_latest(tenant_id, entity).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].key, "temperature");
    }
}
