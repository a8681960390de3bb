pub mod dao;
pub mod error;
pub mod memory;
pub mod registry;

pub use dao::{
    AttributesDao, AuditLogDao, EventDao, PartitionsDao, RelationDao, TenantDao, TenantEntityDao,
    TimeseriesLatestDao,
};
pub use error::DataSourceError;
pub use memory::InMemoryDataSource;
pub use registry::{DataSources, EntityDaoRegistry};

#[cfg(feature = "testing")]
pub use dao::{
    MockAttributesDao, MockAuditLogDao, MockEventDao, MockPartitionsDao, MockRelationDao,
    MockTenantDao, MockTenantEntityDao, MockTimeseriesLatestDao,
};
