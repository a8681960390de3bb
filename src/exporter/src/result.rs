use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use common::ObjectType;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Per-category record counters. Incremented by the worker strictly after a
/// successful storage save; readable by pollers at any time.
#[derive(Debug)]
pub struct ExportStats {
    counters: [AtomicU64; ObjectType::COUNT],
}

impl ExportStats {
    fn new() -> Self {
        Self {
            counters: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    pub fn report(&self, object_type: ObjectType) {
        self.counters[object_type.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, object_type: ObjectType) -> u64 {
        self.counters[object_type.index()].load(Ordering::Relaxed)
    }

    /// Counters with at least one reported record, in declared type order.
    pub fn snapshot(&self) -> BTreeMap<ObjectType, u64> {
        ObjectType::VALUES
            .into_iter()
            .filter_map(|object_type| {
                let count = self.get(object_type);
                (count > 0).then_some((object_type, count))
            })
            .collect()
    }
}

/// Live result of one export job. Mutated only by the single worker running
/// the job; polled concurrently through `snapshot`. Reaches at most one
/// terminal state.
#[derive(Debug)]
pub struct TenantExportResult {
    done: AtomicBool,
    success: AtomicBool,
    terminal: AtomicBool,
    error: OnceCell<String>,
    stats: ExportStats,
}

impl TenantExportResult {
    pub fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
            success: AtomicBool::new(false),
            terminal: AtomicBool::new(false),
            error: OnceCell::new(),
            stats: ExportStats::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn is_success(&self) -> bool {
        self.success.load(Ordering::Acquire)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.get().map(String::as_str)
    }

    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    pub fn report(&self, object_type: ObjectType) {
        self.stats.report(object_type);
    }

    /// Terminal success. A second terminal transition is a worker bug and is
    /// ignored.
    pub(crate) fn succeed(&self) {
        if self.terminal.swap(true, Ordering::AcqRel) {
            return;
        }
        self.success.store(true, Ordering::Release);
        self.done.store(true, Ordering::Release);
    }

    /// Terminal failure, capturing the error text surfaced on download.
    pub(crate) fn fail(&self, error: String) {
        if self.terminal.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.error.set(error);
        self.done.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> ExportStatus {
        ExportStatus {
            done: self.is_done(),
            success: self.is_success(),
            error: self.error().map(str::to_string),
            stats: self.stats.snapshot(),
        }
    }
}

impl Default for TenantExportResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a result, handed to pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportStatus {
    pub done: bool,
    pub success: bool,
    pub error: Option<String>,
    pub stats: BTreeMap<ObjectType, u64>,
}
