use std::collections::HashMap;
use std::sync::Arc;

use common::ObjectType;

use crate::dao::{
    AttributesDao, AuditLogDao, EventDao, PartitionsDao, RelationDao, TenantDao, TenantEntityDao,
    TimeseriesLatestDao,
};
use crate::error::DataSourceError;

/// Lookup table mapping an entity category to its data-access object.
/// Categories without a registered dao are a typed error at traversal time,
/// so adding a category is a registration, not a code change in the engine.
#[derive(Default)]
pub struct EntityDaoRegistry {
    daos: HashMap<ObjectType, Arc<dyn TenantEntityDao>>,
}

impl EntityDaoRegistry {
    pub fn builder() -> EntityDaoRegistryBuilder {
        EntityDaoRegistryBuilder::default()
    }

    pub fn get(&self, object_type: ObjectType) -> Result<Arc<dyn TenantEntityDao>, DataSourceError> {
        self.daos
            .get(&object_type)
            .cloned()
            .ok_or(DataSourceError::UnregisteredType(object_type))
    }

    pub fn registered_types(&self) -> Vec<ObjectType> {
        ObjectType::VALUES
            .into_iter()
            .filter(|t| self.daos.contains_key(t))
            .collect()
    }
}

#[derive(Default)]
pub struct EntityDaoRegistryBuilder {
    daos: HashMap<ObjectType, Arc<dyn TenantEntityDao>>,
}

impl EntityDaoRegistryBuilder {
    /// Register a dao under the category it reports. A later registration for
    /// the same category replaces the earlier one.
    pub fn register(mut self, dao: Arc<dyn TenantEntityDao>) -> Self {
        self.daos.insert(dao.object_type(), dao);
        self
    }

    pub fn build(self) -> EntityDaoRegistry {
        EntityDaoRegistry { daos: self.daos }
    }
}

/// Everything the export service reads from. One bundle per deployment,
/// cloned freely; all members are shared handles.
#[derive(Clone)]
pub struct DataSources {
    pub tenants: Arc<dyn TenantDao>,
    pub entities: Arc<EntityDaoRegistry>,
    pub relations: Arc<dyn RelationDao>,
    pub attributes: Arc<dyn AttributesDao>,
    pub ts_latest: Arc<dyn TimeseriesLatestDao>,
    pub events: Arc<dyn EventDao>,
    pub audit_logs: Arc<dyn AuditLogDao>,
    pub partitions: Arc<dyn PartitionsDao>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{EntityRecord, PageData, PageLink, TenantId};

    struct StubDao(ObjectType);

    #[async_trait]
    impl TenantEntityDao for StubDao {
        fn object_type(&self) -> ObjectType {
            self.0
        }

        async fn find_all_by_tenant_id(
            &self,
            _tenant_id: TenantId,
            _link: PageLink,
        ) -> Result<PageData<EntityRecord>, DataSourceError> {
            Ok(PageData::empty())
        }
    }

    #[test]
    fn lookup_of_unregistered_type_is_an_error() {
        let registry = EntityDaoRegistry::builder()
            .register(Arc::new(StubDao(ObjectType::Device)))
            .build();

        assert!(registry.get(ObjectType::Device).is_ok());
        assert!(matches!(
            registry.get(ObjectType::Asset),
            Err(DataSourceError::UnregisteredType(ObjectType::Asset))
        ));
    }

    #[test]
    fn registered_types_follow_declared_order() {
        let registry = EntityDaoRegistry::builder()
            .register(Arc::new(StubDao(ObjectType::Asset)))
            .register(Arc::new(StubDao(ObjectType::Customer)))
            .build();

        assert_eq!(
            registry.registered_types(),
            vec![ObjectType::Customer, ObjectType::Asset]
        );
    }
}
