//! Filesystem implementation of the SourceStore trait.
//!
//! Layout: one `{name}.json` file per source under a root directory, each
//! holding exactly the canonical JSON of the payload.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use observable_entropy_core::{canonicalize, parse_source_record, SourceName, SourceRecord};

use crate::error::{Result, StoreError};
use crate::traits::SourceStore;

/// Source records stored as files in a directory.
///
/// The directory is created on first write and removed by [`clear`].
///
/// [`clear`]: SourceStore::clear
#[derive(Debug, Clone)]
pub struct FsSourceStore {
    root: PathBuf,
}

impl FsSourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &SourceName) -> PathBuf {
        self.root.join(name.file_name())
    }

    async fn read_record(&self, name: SourceName, path: &Path) -> Result<SourceRecord> {
        let bytes = tokio::fs::read(path).await?;
        let payload = serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(parse_source_record(name.as_str(), payload)?)
    }
}

#[async_trait]
impl SourceStore for FsSourceStore {
    async fn put(&self, record: &SourceRecord) -> Result<()> {
        let bytes = canonicalize(&record.payload)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(&record.name);
        tokio::fs::write(&path, bytes).await?;
        debug!(source = %record.name, path = %path.display(), "source record written");
        Ok(())
    }

    async fn get(&self, name: &SourceName) -> Result<Option<SourceRecord>> {
        let path = self.path_for(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        self.read_record(name.clone(), &path).await.map(Some)
    }

    async fn list(&self) -> Result<Vec<SourceRecord>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "entropy directory missing, no records");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(stem) = json_stem(&path) else {
                continue;
            };
            let name = match SourceName::new(stem) {
                Ok(name) => name,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping file with invalid source name"
                    );
                    continue;
                }
            };
            // An unreadable record fails the listing; signing without it
            // would drop data that was collected.
            let record = self.read_record(name, &path).await.map_err(|e| {
                warn!(path = %path.display(), error = %e, "unreadable source record");
                e
            })?;
            records.push(record);
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                debug!(root = %self.root.display(), "entropy directory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `bitcoin.json` -> `bitcoin`; anything not ending in `.json` -> `None`.
fn json_stem(path: &Path) -> Option<&str> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()
}
