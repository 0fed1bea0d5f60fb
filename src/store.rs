//! Content-addressed filesystem store for BOM entries.
//!
//! On-disk layout under the configured root:
//!
//! ```text
//! <root>/<escapedSerial>/<version>/bom.<ext>     original submission bytes
//! <root>/<escapedSerial>/<version>/stored-at     ISO-8601 storage timestamp
//! <root>/.tmp/<random-128-bit-hex>/              staging for in-flight writes
//! ```
//!
//! The commit point is an atomic directory rename from the staging namespace
//! to the final path. Two racing writers for the same `(serial, version)`
//! both build staging directories; whichever rename lands first wins and the
//! loser observes the collision as [`RepoError::AlreadyExists`]. Readers see
//! either the pre-rename or post-rename state, never a torn entry. The
//! `.tmp` namespace must live on the same mount as the root so the rename
//! stays atomic.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::codec::{self, BomFormat};
use crate::error::{RepoError, Result};
use crate::model::{Bom, SerialNumber, SpecVersion};

const TMP_DIR: &str = ".tmp";
const STORED_AT_FILE: &str = "stored-at";
const BOM_FILE_STEM: &str = "bom";

/// Attempts before giving up when auto-assigned versions keep colliding.
const AUTO_VERSION_RETRIES: u32 = 8;

/// URL-style escaping for serial numbers: keep unreserved characters, encode
/// everything else so URN colons become filesystem-safe.
const SERIAL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A fully materialized entry: parsed model plus storage metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub serial_number: SerialNumber,
    pub version: u32,
    pub stored_at: DateTime<Utc>,
    /// Format of the original submission
    pub format: BomFormat,
    /// Schema version the original document declared
    pub spec_version: SpecVersion,
    pub bom: Bom,
}

/// The original submission, byte-identical to what the client sent.
#[derive(Debug, Clone)]
pub struct OriginalBom {
    pub bytes: Vec<u8>,
    pub format: BomFormat,
}

/// Receipt for a successful store.
#[derive(Debug, Clone, Copy)]
pub struct StoreReceipt {
    pub version: u32,
    pub stored_at: DateTime<Utc>,
}

/// Filesystem-backed BOM store.
///
/// All operations are safe to call concurrently; the only serialization
/// point is the per-entry rename commit.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if necessary) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| RepoError::storage(&root, e))?;
        let tmp = root.join(TMP_DIR);
        tokio::fs::create_dir_all(&tmp)
            .await
            .map_err(|e| RepoError::storage(&tmp, e))?;
        Ok(Self { root })
    }

    /// The store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist the original submission bytes for `(serial, version)`.
    ///
    /// When `version` is `None` the next free version is assigned
    /// (`max(existing) + 1`, or `1` for a new serial); a lost race on an
    /// auto-assigned version is retried with a fresh number. An explicit
    /// version that already exists fails with [`RepoError::AlreadyExists`].
    pub async fn store(
        &self,
        serial: &SerialNumber,
        version: Option<u32>,
        bytes: &[u8],
        format: BomFormat,
    ) -> Result<StoreReceipt> {
        if version == Some(0) {
            return Err(RepoError::InvalidVersion { value: "0".into() });
        }

        let mut attempt = 0;
        loop {
            let target_version = match version {
                Some(v) => v,
                None => self.list(serial).await?.last().copied().unwrap_or(0) + 1,
            };

            match self
                .try_store_at(serial, target_version, bytes, format)
                .await
            {
                Err(RepoError::AlreadyExists { .. })
                    if version.is_none() && attempt < AUTO_VERSION_RETRIES =>
                {
                    // Another writer claimed the version we computed; pick
                    // the next free number and try again.
                    attempt += 1;
                    continue;
                }
                other => return other,
            }
        }
    }

    async fn try_store_at(
        &self,
        serial: &SerialNumber,
        version: u32,
        bytes: &[u8],
        format: BomFormat,
    ) -> Result<StoreReceipt> {
        let final_dir = self.version_dir(serial, version);
        if path_exists(&final_dir).await? {
            return Err(RepoError::AlreadyExists {
                serial: serial.to_string(),
                version,
            });
        }

        let staging = self.root.join(TMP_DIR).join(random_token());
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| RepoError::storage(&staging, e))?;

        let stored_at = Utc::now();
        let write_result = async {
            let bom_path = staging.join(format!("{BOM_FILE_STEM}.{}", format.file_extension()));
            write_file(&bom_path, bytes).await?;
            let ts_path = staging.join(STORED_AT_FILE);
            write_file(&ts_path, stored_at.to_rfc3339().as_bytes()).await?;

            let serial_dir = self.serial_dir(serial);
            tokio::fs::create_dir_all(&serial_dir)
                .await
                .map_err(|e| RepoError::storage(&serial_dir, e))?;

            // Commit point. A plain rename refuses to replace a non-empty
            // directory on every platform we care about, which is exactly
            // the collision semantics the store needs.
            match tokio::fs::rename(&staging, &final_dir).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    if path_exists(&final_dir).await.unwrap_or(false) {
                        Err(RepoError::AlreadyExists {
                            serial: serial.to_string(),
                            version,
                        })
                    } else {
                        Err(RepoError::storage(&final_dir, e))
                    }
                }
            }
        }
        .await;

        match write_result {
            Ok(()) => {
                debug!(serial = %serial, version, format = %format, "stored BOM entry");
                Ok(StoreReceipt { version, stored_at })
            }
            Err(err) => {
                // Best-effort cleanup; an abandoned staging dir is also
                // reclaimed by the retention sweeper.
                if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                    warn!(path = %staging.display(), error = %cleanup, "failed to remove staging dir");
                }
                Err(err)
            }
        }
    }

    /// Retrieve and decode the entry for `(serial, version)`.
    pub async fn retrieve(&self, serial: &SerialNumber, version: u32) -> Result<StoredEntry> {
        let original = self.retrieve_original(serial, version).await?;
        let decoded = codec::decode(original.format, &original.bytes)?;
        let stored_at = self
            .read_stored_at(serial, version)
            .await
            .unwrap_or_else(Utc::now);

        Ok(StoredEntry {
            serial_number: serial.clone(),
            version,
            stored_at,
            format: original.format,
            spec_version: decoded.spec_version,
            bom: decoded.bom,
        })
    }

    /// Retrieve the highest stored version for `serial`.
    pub async fn retrieve_latest(&self, serial: &SerialNumber) -> Result<StoredEntry> {
        let version = self
            .latest_version(serial)
            .await?
            .ok_or_else(|| RepoError::not_found(serial.to_string(), None))?;
        self.retrieve(serial, version).await
    }

    /// Return the original submission bytes unchanged.
    pub async fn retrieve_original(
        &self,
        serial: &SerialNumber,
        version: u32,
    ) -> Result<OriginalBom> {
        let dir = self.version_dir(serial, version);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::not_found(serial.to_string(), Some(version)));
            }
            Err(e) => return Err(RepoError::storage(&dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage(&dir, e))?
        {
            let path = entry.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            let ext = path.extension().and_then(|s| s.to_str());
            if stem != Some(BOM_FILE_STEM) {
                continue;
            }
            let Some(format) = ext.and_then(BomFormat::from_extension) else {
                continue;
            };
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                // A concurrent delete between read_dir and read maps to NotFound
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(RepoError::not_found(serial.to_string(), Some(version)));
                }
                Err(e) => return Err(RepoError::storage(&path, e)),
            };
            return Ok(OriginalBom { bytes, format });
        }

        Err(RepoError::not_found(serial.to_string(), Some(version)))
    }

    /// All stored versions for `serial`, ascending. Unknown serials yield an
    /// empty list, not an error.
    pub async fn list(&self, serial: &SerialNumber) -> Result<Vec<u32>> {
        let dir = self.serial_dir(serial);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::storage(&dir, e)),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage(&dir, e))?
        {
            if let Some(version) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            {
                versions.push(version);
            }
        }
        versions.sort_unstable();
        Ok(versions)
    }

    /// Enumerate every serial number with at least one stored version.
    pub async fn list_all(&self) -> Result<Vec<SerialNumber>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| RepoError::storage(&self.root, e))?;

        let mut serials = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage(&self.root, e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name == TMP_DIR {
                continue;
            }
            match unescape_serial(name) {
                Some(serial) => serials.push(serial),
                // Foreign directories under the root are ignored, not fatal
                None => debug!(name, "skipping non-serial directory in store root"),
            }
        }
        serials.sort();
        Ok(serials)
    }

    /// The highest stored version for `serial`, if any.
    pub async fn latest_version(&self, serial: &SerialNumber) -> Result<Option<u32>> {
        Ok(self.list(serial).await?.last().copied())
    }

    /// Whether `(serial, version)` exists.
    pub async fn exists(&self, serial: &SerialNumber, version: u32) -> Result<bool> {
        path_exists(&self.version_dir(serial, version)).await
    }

    /// Storage timestamp of `(serial, version)` from the sidecar file,
    /// falling back to the directory mtime for entries written by hand.
    pub async fn stored_at(&self, serial: &SerialNumber, version: u32) -> Result<DateTime<Utc>> {
        if !self.exists(serial, version).await? {
            return Err(RepoError::not_found(serial.to_string(), Some(version)));
        }
        Ok(self
            .read_stored_at(serial, version)
            .await
            .unwrap_or_else(Utc::now))
    }

    /// Delete one version. Deleting the last version removes the serial
    /// entirely so `list_all` never reports an empty serial.
    pub async fn delete(&self, serial: &SerialNumber, version: u32) -> Result<()> {
        let dir = self.version_dir(serial, version);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepoError::not_found(serial.to_string(), Some(version)));
            }
            Err(e) => return Err(RepoError::storage(&dir, e)),
        }

        // Remove the now-empty serial directory; a concurrent writer racing
        // this rmdir simply wins and the error is ignored.
        let serial_dir = self.serial_dir(serial);
        if self.list(serial).await?.is_empty() {
            let _ = tokio::fs::remove_dir(&serial_dir).await;
        }
        debug!(serial = %serial, version, "deleted BOM entry");
        Ok(())
    }

    /// Delete every version of `serial`. Idempotent: an unknown serial is
    /// not an error.
    pub async fn delete_all(&self, serial: &SerialNumber) -> Result<()> {
        let dir = self.serial_dir(serial);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(serial = %serial, "deleted all BOM versions");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepoError::storage(&dir, e)),
        }
    }

    /// Remove staging directories older than `older_than`, left behind by
    /// crashed or aborted writers. Returns how many were reaped.
    pub async fn reap_stale_tmp(&self, older_than: std::time::Duration) -> Result<usize> {
        let tmp = self.root.join(TMP_DIR);
        let mut entries = match tokio::fs::read_dir(&tmp).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(RepoError::storage(&tmp, e)),
        };

        let cutoff = std::time::SystemTime::now() - older_than;
        let mut reaped = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage(&tmp, e))?
        {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            let age_ok = metadata
                .modified()
                .map(|mtime| mtime < cutoff)
                .unwrap_or(false);
            if !age_ok {
                continue;
            }
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => reaped += 1,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to reap staging dir")
                }
            }
        }
        Ok(reaped)
    }

    fn serial_dir(&self, serial: &SerialNumber) -> PathBuf {
        self.root.join(escape_serial(serial))
    }

    fn version_dir(&self, serial: &SerialNumber, version: u32) -> PathBuf {
        self.serial_dir(serial).join(version.to_string())
    }

    async fn read_stored_at(
        &self,
        serial: &SerialNumber,
        version: u32,
    ) -> Option<DateTime<Utc>> {
        let path = self.version_dir(serial, version).join(STORED_AT_FILE);
        if let Ok(text) = tokio::fs::read_to_string(&path).await {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text.trim()) {
                return Some(parsed.with_timezone(&Utc));
            }
        }
        // Sidecar missing or unreadable: the entry directory's mtime is the
        // closest thing to a creation timestamp.
        let meta = tokio::fs::metadata(self.version_dir(serial, version))
            .await
            .ok()?;
        Some(DateTime::<Utc>::from(meta.modified().ok()?))
    }
}

/// Escape a serial number for use as a directory name.
#[must_use]
pub fn escape_serial(serial: &SerialNumber) -> String {
    utf8_percent_encode(serial.as_str(), SERIAL_ESCAPE).to_string()
}

fn unescape_serial(name: &str) -> Option<SerialNumber> {
    let decoded = percent_decode_str(name).decode_utf8().ok()?;
    SerialNumber::new(&decoded).ok()
}

fn random_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(32);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

async fn path_exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| RepoError::storage(path, e))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| RepoError::storage(path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| RepoError::storage(path, e))?;
    file.flush().await.map_err(|e| RepoError::storage(path, e))?;
    Ok(())
}
