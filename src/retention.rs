//! Retention policy and the background sweep task.
//!
//! The sweeper walks every serial once per interval and deletes entries
//! that violate the configured policy, plus staging directories abandoned
//! by crashed writers. The policy is a union: an entry is deleted when it
//! exceeds the per-serial version cap **or** the age limit, but the newest
//! version of a serial is always retained.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::FileStore;

/// Abandoned staging directories older than this are reclaimed each sweep.
pub const TMP_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// Retention policy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Keep only the N highest versions per serial; `None` = unlimited
    pub max_versions: Option<u32>,
    /// Delete entries stored more than N days ago; `None` = unlimited
    pub max_age_days: Option<u32>,
    /// Time between sweeps
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_versions: None,
            max_age_days: None,
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl RetentionConfig {
    /// Whether any pruning rule is active (tmp reaping runs regardless).
    #[must_use]
    pub fn prunes_entries(&self) -> bool {
        self.max_versions.is_some() || self.max_age_days.is_some()
    }
}

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Serials examined
    pub serials: usize,
    /// Entries deleted by policy
    pub deleted_entries: usize,
    /// Abandoned staging directories removed
    pub reaped_tmp_dirs: usize,
}

/// Run one sweep over the whole store.
///
/// Per-serial failures are logged and skipped so one bad directory cannot
/// wedge the sweeper; only a failure to enumerate the root is fatal.
pub async fn sweep(store: &FileStore, config: &RetentionConfig) -> Result<SweepStats> {
    let mut stats = SweepStats::default();

    if config.prunes_entries() {
        let cutoff = config
            .max_age_days
            .map(|days| Utc::now() - chrono::Duration::days(i64::from(days)));

        for serial in store.list_all().await? {
            stats.serials += 1;
            let versions = match store.list(&serial).await {
                Ok(versions) => versions,
                Err(e) => {
                    warn!(serial = %serial, error = %e, "retention: failed to list versions");
                    continue;
                }
            };
            let Some(&newest) = versions.last() else {
                continue;
            };

            let mut victims: BTreeSet<u32> = BTreeSet::new();

            if let Some(max) = config.max_versions {
                let excess = versions.len().saturating_sub(max as usize);
                victims.extend(versions.iter().take(excess).copied());
            }

            if let Some(cutoff) = cutoff {
                for &version in &versions {
                    match store.stored_at(&serial, version).await {
                        Ok(stored_at) if stored_at < cutoff => {
                            victims.insert(version);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(serial = %serial, version, error = %e,
                                  "retention: failed to read stored-at");
                        }
                    }
                }
            }

            // Every serial keeps at least its newest version
            victims.remove(&newest);

            for version in victims {
                match store.delete(&serial, version).await {
                    Ok(()) => {
                        stats.deleted_entries += 1;
                        debug!(serial = %serial, version, "retention: deleted entry");
                    }
                    Err(e) => {
                        warn!(serial = %serial, version, error = %e, "retention: delete failed");
                    }
                }
            }
        }
    }

    match store.reap_stale_tmp(TMP_MAX_AGE).await {
        Ok(reaped) => stats.reaped_tmp_dirs = reaped,
        Err(e) => warn!(error = %e, "retention: tmp reaping failed"),
    }

    Ok(stats)
}

/// Handle to the background sweeper; dropping it does not stop the task,
/// call [`RetentionTask::shutdown`].
#[derive(Debug)]
pub struct RetentionTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RetentionTask {
    /// Spawn the periodic sweeper.
    #[must_use]
    pub fn spawn(store: Arc<FileStore>, config: RetentionConfig) -> Self {
        let (stop, mut stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        info!("retention sweeper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match sweep(&store, &config).await {
                            Ok(stats) if stats.deleted_entries > 0 || stats.reaped_tmp_dirs > 0 => {
                                info!(
                                    serials = stats.serials,
                                    deleted = stats.deleted_entries,
                                    reaped_tmp = stats.reaped_tmp_dirs,
                                    "retention sweep finished"
                                );
                            }
                            Ok(stats) => {
                                debug!(serials = stats.serials, "retention sweep finished, nothing to do");
                            }
                            Err(e) => warn!(error = %e, "retention sweep failed"),
                        }
                    }
                }
            }
        });
        Self { stop, handle }
    }

    /// Stop the sweeper and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BomFormat;
    use crate::model::SerialNumber;

    const SERIAL: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";
    const SERIAL_B: &str = "urn:uuid:aabbccdd-1122-3344-5566-77889900aabb";

    fn bom_bytes() -> Vec<u8> {
        format!(
            r#"{{"bomFormat": "CycloneDX", "specVersion": "1.4", "serialNumber": "{SERIAL}"}}"#
        )
        .into_bytes()
    }

    async fn seeded_store(dir: &std::path::Path, versions: u32) -> FileStore {
        let store = FileStore::open(dir).await.unwrap();
        let serial = SerialNumber::new(SERIAL).unwrap();
        for _ in 0..versions {
            store
                .store(&serial, None, &bom_bytes(), BomFormat::Json)
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_sweep_enforces_version_cap() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = seeded_store(dir.path(), 5).await;
        let serial = SerialNumber::new(SERIAL).unwrap();

        let config = RetentionConfig {
            max_versions: Some(2),
            ..RetentionConfig::default()
        };
        let stats = sweep(&store, &config).await.unwrap();

        assert_eq!(stats.deleted_entries, 3);
        assert_eq!(store.list(&serial).await.unwrap(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_sweep_always_keeps_newest() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = seeded_store(dir.path(), 3).await;
        let serial = SerialNumber::new(SERIAL).unwrap();

        // An age limit of zero days marks everything as expired; the newest
        // version must still survive
        let config = RetentionConfig {
            max_age_days: Some(0),
            ..RetentionConfig::default()
        };
        let stats = sweep(&store, &config).await.unwrap();

        assert_eq!(stats.deleted_entries, 2);
        assert_eq!(store.list(&serial).await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_sweep_union_of_policies() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = seeded_store(dir.path(), 4).await;
        let serial = SerialNumber::new(SERIAL).unwrap();

        // Version cap alone would keep 1..=4 minus the oldest one; the age
        // rule additionally condemns everything but the newest
        let config = RetentionConfig {
            max_versions: Some(3),
            max_age_days: Some(0),
            ..RetentionConfig::default()
        };
        sweep(&store, &config).await.unwrap();
        assert_eq!(store.list(&serial).await.unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn test_sweep_without_policy_only_reaps_tmp() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = seeded_store(dir.path(), 3).await;
        let serial = SerialNumber::new(SERIAL).unwrap();

        let stats = sweep(&store, &RetentionConfig::default()).await.unwrap();
        assert_eq!(stats.deleted_entries, 0);
        assert_eq!(store.list(&serial).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_sweep_covers_multiple_serials() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = seeded_store(dir.path(), 3).await;
        let other = SerialNumber::new(SERIAL_B).unwrap();
        store
            .store(&other, None, &bom_bytes(), BomFormat::Json)
            .await
            .unwrap();

        let config = RetentionConfig {
            max_versions: Some(1),
            ..RetentionConfig::default()
        };
        let stats = sweep(&store, &config).await.unwrap();

        assert_eq!(stats.serials, 2);
        assert_eq!(stats.deleted_entries, 2);
        assert_eq!(store.list(&other).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_retention_task_shutdown() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = Arc::new(FileStore::open(dir.path()).await.unwrap());

        let task = RetentionTask::spawn(
            store,
            RetentionConfig {
                sweep_interval: Duration::from_millis(10),
                ..RetentionConfig::default()
            },
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        task.shutdown().await;
    }
}
