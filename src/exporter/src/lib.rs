pub mod error;
pub mod planner;
pub mod registry;
pub mod result;
pub mod service;
pub mod traversal;

pub use error::ExportError;
pub use planner::{collect_partitions, plan_partitions, PartitionMap};
pub use registry::ResultRegistry;
pub use result::{ExportStats, ExportStatus, TenantExportResult};
pub use service::TenantExportService;
pub use traversal::TenantExporter;
