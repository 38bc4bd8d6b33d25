use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Activity counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub records_created: Arc<AtomicU64>,
    pub records_updated: Arc<AtomicU64>,
    pub records_deleted: Arc<AtomicU64>,
    pub rows_imported: Arc<AtomicU64>,
    pub rows_exported: Arc<AtomicU64>,
    pub files_uploaded: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            records_created: Arc::new(AtomicU64::new(0)),
            records_updated: Arc::new(AtomicU64::new(0)),
            records_deleted: Arc::new(AtomicU64::new(0)),
            rows_imported: Arc::new(AtomicU64::new(0)),
            rows_exported: Arc::new(AtomicU64::new(0)),
            files_uploaded: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_updated(&self) {
        self.records_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_imported(&self, rows: u64) {
        self.rows_imported.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_exported(&self, rows: u64) {
        self.rows_exported.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn inc_uploads(&self) {
        self.files_uploaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_created: self.records_created.load(Ordering::Relaxed),
            records_updated: self.records_updated.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            rows_imported: self.rows_imported.load(Ordering::Relaxed),
            rows_exported: self.rows_exported.load(Ordering::Relaxed),
            files_uploaded: self.files_uploaded.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub records_created: u64,
    pub records_updated: u64,
    pub records_deleted: u64,
    pub rows_imported: u64,
    pub rows_exported: u64,
    pub files_uploaded: u64,
    pub uptime_seconds: u64,
}
