//! End-to-end export flows over the in-memory datasource and a memory-backed
//! object store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::config::ExportConfig;
use common::model::{
    AttributeKvEntry, AttributeScope, AuditLog, Device, EntityRelation, Event, EventType, KvValue,
    Tenant, TenantEntity, TsKvEntry, AUDIT_LOG_TABLE,
};
use common::{ObjectType, TenantExportConfig, TenantId};
use datasource::InMemoryDataSource;
use exporter::{ExportError, ExportStatus, TenantExportService};
use storage::{ExportLayout, ExportStorage, ObjectStoreExportStorage};
use uuid::Uuid;

fn memory_storage() -> Arc<ObjectStoreExportStorage> {
    Arc::new(ObjectStoreExportStorage::new(
        Arc::new(object_store::memory::InMemory::new()),
        ExportLayout::new("exports"),
    ))
}

fn export_config() -> ExportConfig {
    ExportConfig {
        result_ttl: Duration::from_secs(60),
        sweep_interval: Duration::from_secs(3600),
        queue_capacity: 4,
        latest_telemetry_timeout: Duration::from_secs(5),
    }
}

fn seed_tenant(source: &InMemoryDataSource) -> TenantId {
    let tenant_id = TenantId::random();
    source.add_tenant(Tenant {
        id: tenant_id,
        title: "acme".into(),
        region: "eu".into(),
        email: "ops@acme.example".into(),
        created_time: 0,
    });
    tenant_id
}

async fn wait_done(service: &TenantExportService, tenant_id: TenantId) -> ExportStatus {
    for _ in 0..400 {
        let status = service.get_status(tenant_id).unwrap();
        if status.done {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("export for {tenant_id} did not finish");
}

fn tar_entries(bytes: &[u8]) -> HashMap<String, usize> {
    let mut tar = tar::Archive::new(bytes);
    let mut files = HashMap::new();
    for entry in tar.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut content = String::new();
        std::io::Read::read_to_string(&mut entry, &mut content).unwrap();
        files.insert(name, content.lines().count());
    }
    files
}

/// Two devices, each with one relation, one attribute, one latest telemetry
/// key, and three events spread across the partitions `[100, 200)` and
/// `[200, now)`.
#[tokio::test]
async fn two_device_scenario_counts_every_record() {
    let source = InMemoryDataSource::new();
    let tenant_id = seed_tenant(&source);

    source.set_partitions(EventType::Lifecycle.table(), vec![100, 200]);
    for n in 0..2 {
        let device = Device {
            id: Uuid::new_v4(),
            tenant_id,
            name: format!("device-{n}"),
            device_profile_id: Uuid::new_v4(),
            label: String::new(),
            created_time: 0,
        };
        source.add_entity(tenant_id, &device).unwrap();
        source.add_relation(
            tenant_id,
            EntityRelation {
                from: device.entity_id(),
                to: device.entity_id(),
                relation_type: "Contains".into(),
                type_group: "COMMON".into(),
            },
        );
        source.add_attribute(
            tenant_id,
            device.entity_id(),
            AttributeScope::Client,
            AttributeKvEntry {
                key: "fw".into(),
                value: KvValue::Str("1.0".into()),
                last_update_ts: 10,
            },
        );
        source.add_latest(
            tenant_id,
            device.entity_id(),
            TsKvEntry {
                key: "temperature".into(),
                value: KvValue::Double(20.0),
                ts: 10,
            },
        );
        for ts in [120, 150, 250] {
            source.add_event(Event {
                id: Uuid::new_v4(),
                tenant_id,
                entity_id: device.id,
                event_type: EventType::Lifecycle,
                ts,
                body: serde_json::json!({ "n": n }),
            });
        }
    }

    let service =
        TenantExportService::start(source.data_sources(), memory_storage(), &export_config());
    service
        .submit(TenantExportConfig::new(tenant_id))
        .await
        .unwrap();
    let status = wait_done(&service, tenant_id).await;

    assert!(status.success);
    assert!(status.error.is_none());
    assert_eq!(status.stats[&ObjectType::Tenant], 1);
    assert_eq!(status.stats[&ObjectType::Device], 2);
    assert_eq!(status.stats[&ObjectType::Relation], 2);
    assert_eq!(status.stats[&ObjectType::AttributeKv], 2);
    assert_eq!(status.stats[&ObjectType::LatestTsKv], 2);
    assert_eq!(status.stats[&ObjectType::Event], 6);

    let bytes = service
        .download(tenant_id)
        .await
        .unwrap()
        .into_bytes()
        .await
        .unwrap();
    let files = tar_entries(&bytes);
    assert_eq!(files["tenant.jsonl"], 1);
    assert_eq!(files["device.jsonl"], 2);
    assert_eq!(files["relation.jsonl"], 2);
    assert_eq!(files["attribute_kv.jsonl"], 2);
    assert_eq!(files["latest_ts_kv.jsonl"], 2);
    assert_eq!(files["event.jsonl"], 6);

    service.shutdown().await;
}

#[tokio::test]
async fn download_matches_storage_output() {
    let source = InMemoryDataSource::new();
    let tenant_id = seed_tenant(&source);
    source
        .add_entity(
            tenant_id,
            &Device {
                id: Uuid::new_v4(),
                tenant_id,
                name: "solo".into(),
                device_profile_id: Uuid::new_v4(),
                label: String::new(),
                created_time: 0,
            },
        )
        .unwrap();

    let storage = memory_storage();
    let service =
        TenantExportService::start(source.data_sources(), storage.clone(), &export_config());
    service
        .submit(TenantExportConfig::new(tenant_id))
        .await
        .unwrap();
    wait_done(&service, tenant_id).await;

    let via_service = service
        .download(tenant_id)
        .await
        .unwrap()
        .into_bytes()
        .await
        .unwrap();
    let via_storage = storage
        .download_export_data(tenant_id)
        .await
        .unwrap()
        .into_bytes()
        .await
        .unwrap();
    assert_eq!(via_service, via_storage);

    service.shutdown().await;
}

#[tokio::test]
async fn audit_logs_exported_once_per_tenant() {
    let source = InMemoryDataSource::new();
    let tenant_id = seed_tenant(&source);
    let now = Utc::now().timestamp_millis();

    source.set_partitions(AUDIT_LOG_TABLE, vec![now - 10_000]);
    for n in 0..3 {
        source.add_audit_log(AuditLog {
            id: Uuid::new_v4(),
            tenant_id,
            entity_id: None,
            user_name: "admin".into(),
            action_type: "LOGIN".into(),
            created_time: now - 5_000 + n,
        });
    }

    let service =
        TenantExportService::start(source.data_sources(), memory_storage(), &export_config());
    service
        .submit(TenantExportConfig::new(tenant_id))
        .await
        .unwrap();
    let status = wait_done(&service, tenant_id).await;

    assert!(status.success);
    assert_eq!(status.stats[&ObjectType::AuditLog], 3);

    service.shutdown().await;
}

#[tokio::test]
async fn ttl_eviction_cleans_up_artifacts() {
    let source = InMemoryDataSource::new();
    let tenant_id = seed_tenant(&source);

    let storage = memory_storage();
    let config = ExportConfig {
        result_ttl: Duration::from_millis(50),
        sweep_interval: Duration::from_millis(20),
        ..export_config()
    };
    let service = TenantExportService::start(source.data_sources(), storage.clone(), &config);

    service
        .submit(TenantExportConfig::new(tenant_id))
        .await
        .unwrap();
    let status = wait_done(&service, tenant_id).await;
    assert!(status.success);

    // no accesses: the entry expires and its artifacts are reclaimed
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(matches!(
        service.get_status(tenant_id).unwrap_err(),
        ExportError::ResultNotFound(_)
    ));
    assert!(matches!(
        storage.download_export_data(tenant_id).await.unwrap_err(),
        storage::StorageError::ArchiveNotFound(_)
    ));

    // the handle is free for a new submission after eviction
    service
        .submit(TenantExportConfig::new(tenant_id))
        .await
        .unwrap();
    wait_done(&service, tenant_id).await;

    service.shutdown().await;
}

#[tokio::test]
async fn skipped_categories_are_absent_from_the_archive() {
    let source = InMemoryDataSource::new();
    let tenant_id = seed_tenant(&source);
    source
        .add_entity(
            tenant_id,
            &Device {
                id: Uuid::new_v4(),
                tenant_id,
                name: "kept".into(),
                device_profile_id: Uuid::new_v4(),
                label: String::new(),
                created_time: 0,
            },
        )
        .unwrap();

    let service =
        TenantExportService::start(source.data_sources(), memory_storage(), &export_config());
    service
        .submit(TenantExportConfig::new(tenant_id).skip(ObjectType::Device))
        .await
        .unwrap();
    let status = wait_done(&service, tenant_id).await;

    assert!(status.success);
    assert!(!status.stats.contains_key(&ObjectType::Device));

    let bytes = service
        .download(tenant_id)
        .await
        .unwrap()
        .into_bytes()
        .await
        .unwrap();
    let files = tar_entries(&bytes);
    assert!(!files.contains_key("device.jsonl"));
    assert!(files.contains_key("tenant.jsonl"));

    service.shutdown().await;
}
