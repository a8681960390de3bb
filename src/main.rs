use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use common::config::{Configuration, CONFIG};
use common::model::{
    AttributeKvEntry, AttributeScope, AuditLog, Device, DeviceProfile, EntityRelation, Event,
    EventType, KvValue, Tenant, TenantEntity, TsKvEntry, AUDIT_LOG_TABLE,
};
use common::{TenantExportConfig, TenantId};
use datasource::InMemoryDataSource;
use exporter::TenantExportService;
use storage::{create_object_store_from_dsn, ExportLayout, ObjectStoreExportStorage};
use tracing::info;
use uuid::Uuid;

/// Demo wiring: seeds an in-memory tenant, runs one export end to end
/// against the configured storage backend, and prints the result.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Configuration::load()
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    let config = CONFIG.get_or_init(|| config);

    let object_store = create_object_store_from_dsn(&config.storage.dsn)
        .context("failed to create export object store")?;
    let export_storage = Arc::new(ObjectStoreExportStorage::new(
        object_store,
        ExportLayout::new(&config.storage.prefix),
    ));

    let source = InMemoryDataSource::new();
    let tenant_id = seed_demo_tenant(&source)?;

    let service =
        TenantExportService::start(source.data_sources(), export_storage, &config.export);

    let handle = service.submit(TenantExportConfig::new(tenant_id)).await?;
    info!("Submitted export job {handle}");

    let status = loop {
        let status = service.get_status(handle)?;
        if status.done {
            break status;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };
    info!(
        "Export finished: success={}, stats={}",
        status.success,
        serde_json::to_string(&status.stats)?
    );

    let archive = service.download(handle).await?;
    let file_name = archive.file_name.clone();
    let bytes = archive.into_bytes().await?;
    info!("Downloaded {file_name}: {} bytes", bytes.len());

    service.shutdown().await;
    Ok(())
}

fn seed_demo_tenant(source: &InMemoryDataSource) -> Result<TenantId> {
    let tenant_id = TenantId::random();
    let now = Utc::now().timestamp_millis();

    source.add_tenant(Tenant {
        id: tenant_id,
        title: "Demo Tenant".into(),
        region: "eu-west".into(),
        email: "ops@demo.example".into(),
        created_time: now,
    });

    let profile = DeviceProfile {
        id: Uuid::new_v4(),
        tenant_id,
        name: "thermostat".into(),
        description: "Demo device profile".into(),
        default: true,
        created_time: now,
    };
    source.add_entity(tenant_id, &profile)?;

    for n in 0..2 {
        let device = Device {
            id: Uuid::new_v4(),
            tenant_id,
            name: format!("thermostat-{n}"),
            device_profile_id: profile.id,
            label: format!("Floor {n}"),
            created_time: now,
        };
        source.add_entity(tenant_id, &device)?;

        source.add_relation(
            tenant_id,
            EntityRelation {
                from: device.entity_id(),
                to: profile.entity_id(),
                relation_type: "Uses".into(),
                type_group: "COMMON".into(),
            },
        );
        source.add_attribute(
            tenant_id,
            device.entity_id(),
            AttributeScope::Server,
            AttributeKvEntry {
                key: "firmware".into(),
                value: KvValue::Str("2.4.1".into()),
                last_update_ts: now,
            },
        );
        source.add_latest(
            tenant_id,
            device.entity_id(),
            TsKvEntry {
                key: "temperature".into(),
                value: KvValue::Double(21.5),
                ts: now,
            },
        );
        source.add_event(Event {
            id: Uuid::new_v4(),
            tenant_id,
            entity_id: device.id,
            event_type: EventType::Lifecycle,
            ts: now - 1_000,
            body: serde_json::json!({ "event": "STARTED" }),
        });
    }

    source.set_partitions(EventType::Lifecycle.table(), vec![now - 3_600_000]);
    source.set_partitions(AUDIT_LOG_TABLE, vec![now - 3_600_000]);
    source.add_audit_log(AuditLog {
        id: Uuid::new_v4(),
        tenant_id,
        entity_id: None,
        user_name: "demo@demo.example".into(),
        action_type: "LOGIN".into(),
        created_time: now - 60_000,
    });

    Ok(tenant_id)
}
