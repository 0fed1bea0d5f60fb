//! Repository metadata service.
//!
//! A long-lived component that owns the store, runs the retention sweeper,
//! and tracks repository-wide metadata: when the service came up and the
//! newest schema version seen per wire format. Handlers go through this
//! type rather than holding the store directly so shutdown has a single
//! owner.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::codec::BomFormat;
use crate::model::SpecVersion;
use crate::retention::{RetentionConfig, RetentionTask};
use crate::store::FileStore;

/// Repository-wide metadata snapshot.
#[derive(Debug, Clone)]
pub struct RepoMetadata {
    /// When this service instance started
    pub started_at: DateTime<Utc>,
    /// Newest schema version ingested per format since startup
    pub last_seen: HashMap<BomFormat, SpecVersion>,
}

/// Long-lived service wrapping the store and background maintenance.
pub struct RepoService {
    store: Arc<FileStore>,
    metadata: RwLock<RepoMetadata>,
    retention: Mutex<Option<RetentionTask>>,
}

impl RepoService {
    /// Create the service around an opened store.
    #[must_use]
    pub fn new(store: FileStore) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(store),
            metadata: RwLock::new(RepoMetadata {
                started_at: Utc::now(),
                last_seen: HashMap::new(),
            }),
            retention: Mutex::new(None),
        })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Start the retention sweeper. Starting twice replaces the previous
    /// task after stopping it.
    pub async fn start_retention(&self, config: RetentionConfig) {
        info!(
            max_versions = ?config.max_versions,
            max_age_days = ?config.max_age_days,
            interval_secs = config.sweep_interval.as_secs(),
            "starting retention sweeper"
        );
        let task = RetentionTask::spawn(Arc::clone(&self.store), config);
        let previous = self.retention.lock().await.replace(task);
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
    }

    /// Record a successful ingest for repository metadata.
    pub async fn record_ingest(&self, format: BomFormat, spec_version: SpecVersion) {
        let mut metadata = self.metadata.write().await;
        metadata
            .last_seen
            .entry(format)
            .and_modify(|seen| {
                if spec_version > *seen {
                    *seen = spec_version;
                }
            })
            .or_insert(spec_version);
    }

    /// Current metadata snapshot.
    pub async fn metadata(&self) -> RepoMetadata {
        self.metadata.read().await.clone()
    }

    /// Stop background work. Safe to call more than once.
    pub async fn shutdown(&self) {
        if let Some(task) = self.retention.lock().await.take() {
            task.shutdown().await;
            info!("retention sweeper stopped");
        }
    }
}
