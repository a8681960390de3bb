//! Job orchestrator: a bounded submission queue drained by exactly one
//! worker task, so export jobs run strictly one at a time regardless of
//! tenant. Submission never blocks; status and download are concurrent-safe
//! reads against the registry and storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::config::ExportConfig;
use common::model::Tenant;
use common::{TenantExportConfig, TenantId};
use datasource::DataSources;
use parking_lot::Mutex;
use storage::{ExportArchive, ExportStorage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{error_chain, ExportError};
use crate::registry::ResultRegistry;
use crate::result::{ExportStatus, TenantExportResult};
use crate::traversal::TenantExporter;

struct Job {
    tenant: Tenant,
    config: TenantExportConfig,
    result: Arc<TenantExportResult>,
}

pub struct TenantExportService {
    sources: DataSources,
    storage: Arc<dyn ExportStorage>,
    registry: Arc<ResultRegistry>,
    tx: Mutex<Option<mpsc::Sender<Job>>>,
    queue_capacity: usize,
    queue_depth: Arc<AtomicUsize>,
    worker: Mutex<Option<JoinHandle<()>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl TenantExportService {
    /// Wire the service and spawn its worker and registry sweeper tasks.
    pub fn start(
        sources: DataSources,
        storage: Arc<dyn ExportStorage>,
        config: &ExportConfig,
    ) -> Arc<Self> {
        let registry = Arc::new(ResultRegistry::new(config.result_ttl, storage.clone()));
        let (tx, mut rx) = mpsc::channel::<Job>(config.queue_capacity);
        let queue_depth = Arc::new(AtomicUsize::new(0));

        let exporter = TenantExporter::new(
            sources.clone(),
            storage.clone(),
            config.latest_telemetry_timeout,
        );
        let depth = queue_depth.clone();
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                depth.fetch_sub(1, Ordering::SeqCst);
                Self::run_job(&exporter, job).await;
            }
        });

        let sweep_registry = registry.clone();
        let sweep_interval = config.sweep_interval;
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                sweep_registry.sweep().await;
            }
        });

        Arc::new(Self {
            sources,
            storage,
            registry,
            tx: Mutex::new(Some(tx)),
            queue_capacity: config.queue_capacity,
            queue_depth,
            worker: Mutex::new(Some(worker)),
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Validate and enqueue one export job, returning its handle (the tenant
    /// id) without waiting for the job. Fails up front when the tenant does
    /// not exist, a job for it is still running, or the queue is full.
    pub async fn submit(&self, config: TenantExportConfig) -> Result<TenantId, ExportError> {
        let tenant_id = config.tenant_id;
        info!("[{tenant_id}] Submitting tenant export");

        let tenant = self
            .sources
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or(ExportError::TenantNotFound(tenant_id))?;

        let sender = self
            .tx
            .lock()
            .clone()
            .ok_or(ExportError::ServiceStopped)?;
        // a running job is reported before queue capacity
        if self.registry.is_running(tenant_id) {
            return Err(ExportError::ExportInProgress(tenant_id));
        }
        // reserve the queue slot before registering, so a full queue never
        // replaces an existing finished result
        let permit = sender.try_reserve_owned().map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ExportError::QueueFull {
                capacity: self.queue_capacity,
            },
            mpsc::error::TrySendError::Closed(_) => ExportError::ServiceStopped,
        })?;

        let result = self.registry.register(tenant_id)?;
        // the gauge must lead the send: the worker decrements on receive
        self.queue_depth.fetch_add(1, Ordering::SeqCst);
        let _ = permit.send(Job {
            tenant,
            config,
            result,
        });
        Ok(tenant_id)
    }

    /// Snapshot of a job's live result. Never fails while the handle is
    /// known, whatever state the job is in.
    pub fn get_status(&self, tenant_id: TenantId) -> Result<ExportStatus, ExportError> {
        self.registry
            .get(tenant_id)
            .map(|result| result.snapshot())
            .ok_or(ExportError::ResultNotFound(tenant_id))
    }

    /// Stream the sealed archive of a successfully finished job.
    pub async fn download(&self, tenant_id: TenantId) -> Result<ExportArchive, ExportError> {
        let result = self
            .registry
            .get(tenant_id)
            .ok_or(ExportError::ResultNotFound(tenant_id))?;

        if !result.is_done() {
            return Err(ExportError::NotReady(tenant_id));
        }
        if !result.is_success() {
            return Err(ExportError::ExportFailed {
                tenant_id,
                error: result.error().unwrap_or_default().to_string(),
            });
        }
        Ok(self.storage.download_export_data(tenant_id).await?)
    }

    /// Jobs enqueued but not yet picked up by the worker.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::SeqCst)
    }

    /// Stop intake, let the in-flight job and the queue drain, stop the
    /// sweeper, and clean up every registered result.
    pub async fn shutdown(&self) {
        info!("Shutting down tenant export service");
        drop(self.tx.lock().take());
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Export worker task failed: {e}");
            }
        }
        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.abort();
        }
        self.registry.clear().await;
    }

    async fn run_job(exporter: &TenantExporter, job: Job) {
        let tenant_id = job.tenant.id;
        info!("[{tenant_id}] Starting tenant export");
        match exporter.export(&job.tenant, &job.config, &job.result).await {
            Ok(()) => {
                job.result.succeed();
                info!("[{tenant_id}] Tenant export finished");
            }
            Err(e) => {
                let trace = error_chain(&e);
                error!("[{tenant_id}] Tenant export failed: {trace}");
                job.result.fail(trace);
            }
        }
    }
}
