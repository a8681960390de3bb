//! Entity traversal engine: walks every entity category of a tenant in
//! declared order and runs the four sub-exports (relations, events,
//! attributes, latest telemetry) for each entity, then the tenant-wide audit
//! log export. All-or-nothing: the first unrecovered error aborts the job.

use std::collections::HashSet;
use std::time::Duration;

use common::model::{AttributeKv, AttributeScope, EventType, LatestTsKv, Tenant, AUDIT_LOG_TABLE};
use common::{
    EntityId, ExportRecord, ObjectType, PageLink, TenantExportConfig, TenantId, TimePageLink,
};
use datasource::DataSources;
use serde::Serialize;
use std::sync::Arc;
use storage::ExportStorage;
use tracing::{debug, trace};

use crate::error::ExportError;
use crate::planner::collect_partitions;
use crate::result::TenantExportResult;

/// Page size for entity traversal.
pub const ENTITY_PAGE_SIZE: u32 = 100;
/// Page size for time-windowed event and audit-log queries.
pub const TIME_PAGE_SIZE: u32 = 512;

/// Categories never visited by the generic traversal loop: the tenant record
/// is emitted once up front, the rest are produced by dedicated sub-exports.
const DEFAULT_SKIPPED: [ObjectType; 6] = [
    ObjectType::Tenant,
    ObjectType::Relation,
    ObjectType::Event,
    ObjectType::AttributeKv,
    ObjectType::LatestTsKv,
    ObjectType::AuditLog,
];

pub struct TenantExporter {
    sources: DataSources,
    storage: Arc<dyn ExportStorage>,
    latest_telemetry_timeout: Duration,
}

impl TenantExporter {
    pub fn new(
        sources: DataSources,
        storage: Arc<dyn ExportStorage>,
        latest_telemetry_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            storage,
            latest_telemetry_timeout,
        }
    }

    /// Run one full tenant export: init the workspace, emit the tenant
    /// record, traverse every non-skipped category, export audit logs, seal
    /// the archive. The archive step is only reached on success; a failed
    /// job leaves the partial workspace in place for inspection.
    pub async fn export(
        &self,
        tenant: &Tenant,
        config: &TenantExportConfig,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        let tenant_id = tenant.id;
        self.storage.init(tenant_id).await?;

        let mut skipped: HashSet<ObjectType> = DEFAULT_SKIPPED.into_iter().collect();
        skipped.extend(&config.skipped);

        self.save(tenant_id, ObjectType::Tenant, tenant, result)
            .await?;

        for object_type in ObjectType::VALUES {
            if skipped.contains(&object_type) {
                continue;
            }

            debug!("[{tenant_id}] Exporting {object_type} entities");
            let dao = self.sources.entities.get(object_type)?;

            let mut link = PageLink::new(ENTITY_PAGE_SIZE);
            loop {
                let page = dao.find_all_by_tenant_id(tenant_id, link).await?;
                for entity in page.items {
                    self.save_record(
                        tenant_id,
                        ExportRecord {
                            object_type,
                            data: entity.payload,
                        },
                        result,
                    )
                    .await?;

                    if let Some(entity_id) = entity.entity_id {
                        self.export_relations(tenant_id, entity_id, result).await?;
                        self.export_events(tenant_id, entity_id, result).await?;
                        self.export_attributes(tenant_id, entity_id, result).await?;
                        self.export_latest_telemetry(tenant_id, entity_id, result)
                            .await?;
                    }
                }
                if !page.has_next {
                    break;
                }
                link = link.next();
            }

            debug!(
                "[{tenant_id}] Exported {} {object_type} entities",
                result.stats().get(object_type)
            );
        }

        self.export_audit_logs(tenant_id, result).await?;

        self.storage.archive_export_data(tenant_id).await?;
        Ok(())
    }

    async fn export_relations(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        let relations = self
            .sources
            .relations
            .find_all_by_from(tenant_id, entity_id)
            .await?;
        for relation in relations {
            self.save(tenant_id, ObjectType::Relation, &relation, result)
                .await?;
        }
        Ok(())
    }

    async fn export_events(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        for event_type in EventType::VALUES {
            let partitions =
                collect_partitions(self.sources.partitions.as_ref(), event_type.table()).await?;
            for (start_ts, end_ts) in partitions {
                let mut link =
                    TimePageLink::new(PageLink::new(TIME_PAGE_SIZE), start_ts, end_ts);
                loop {
                    let page = self
                        .sources
                        .events
                        .find_events(tenant_id, entity_id.id, event_type, link)
                        .await?;
                    for event in page.items {
                        self.save(tenant_id, ObjectType::Event, &event, result)
                            .await?;
                    }
                    if !page.has_next {
                        break;
                    }
                    link = link.next();
                }
            }
        }
        Ok(())
    }

    async fn export_attributes(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        for scope in AttributeScope::VALUES {
            let entries = self
                .sources
                .attributes
                .find_all(tenant_id, entity_id, scope)
                .await?;
            for entry in entries {
                let attribute = AttributeKv::new(entity_id, scope, entry);
                self.save(tenant_id, ObjectType::AttributeKv, &attribute, result)
                    .await?;
            }
        }
        Ok(())
    }

    /// The latest-telemetry fetch resolves asynchronously in the data layer;
    /// the traversal waits for it here, bounded by the configured timeout.
    /// This wait is the job's main serialization point.
    async fn export_latest_telemetry(
        &self,
        tenant_id: TenantId,
        entity_id: EntityId,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        let latest = tokio::time::timeout(
            self.latest_telemetry_timeout,
            self.sources.ts_latest.find_all_latest(tenant_id, entity_id),
        )
        .await
        .map_err(|_| {
            ExportError::LatestTelemetryTimeout(entity_id, self.latest_telemetry_timeout)
        })??;

        for entry in latest {
            let latest_ts_kv = LatestTsKv::new(entity_id, entry);
            self.save(tenant_id, ObjectType::LatestTsKv, &latest_ts_kv, result)
                .await?;
        }
        Ok(())
    }

    async fn export_audit_logs(
        &self,
        tenant_id: TenantId,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        let partitions =
            collect_partitions(self.sources.partitions.as_ref(), AUDIT_LOG_TABLE).await?;
        for (start_ts, end_ts) in partitions {
            let mut link = TimePageLink::new(PageLink::new(TIME_PAGE_SIZE), start_ts, end_ts);
            loop {
                let page = self
                    .sources
                    .audit_logs
                    .find_audit_logs_by_tenant_id(tenant_id, link)
                    .await?;
                for audit_log in page.items {
                    self.save(tenant_id, ObjectType::AuditLog, &audit_log, result)
                        .await?;
                }
                if !page.has_next {
                    break;
                }
                link = link.next();
            }
        }
        Ok(())
    }

    async fn save<T: Serialize>(
        &self,
        tenant_id: TenantId,
        object_type: ObjectType,
        entity: &T,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        self.save_record(tenant_id, ExportRecord::wrap(object_type, entity)?, result)
            .await
    }

    /// Hand one wrapped record to storage. The counter is incremented only
    /// after the save succeeded, so stats never overcount.
    async fn save_record(
        &self,
        tenant_id: TenantId,
        record: ExportRecord,
        result: &TenantExportResult,
    ) -> Result<(), ExportError> {
        let object_type = record.object_type;
        self.storage.save(tenant_id, &record).await?;
        result.report(object_type);
        trace!("[{tenant_id}][{object_type}] Saved record");
        Ok(())
    }
}
