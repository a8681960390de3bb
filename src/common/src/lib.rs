pub mod config;
pub mod export;
pub mod id;
pub mod model;
pub mod object_type;
pub mod page;
pub mod record;

pub use export::TenantExportConfig;
pub use id::{EntityId, TenantId};
pub use object_type::ObjectType;
pub use page::{PageData, PageLink, TimePageLink};
pub use record::{EntityRecord, ExportRecord};
