//! Directory-backed persistence store.
//!
//! Each record lives in `<root>/<hash_key>.entry`. Writes go to a temporary
//! file first and are renamed into place, so a crash never leaves a partially
//! written record behind.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::PersistenceAdapter;
use crate::error::{CacheError, Result};

const RECORD_EXTENSION: &str = "entry";
const TEMP_EXTENSION: &str = "tmp";

/// Per-process sequence giving every in-flight write its own temp file.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

// == File Store ==
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a hash key to its record path. Only hex keys are accepted, which
    /// keeps every record inside `root`.
    fn record_path(&self, hash_key: &str) -> Result<PathBuf> {
        if hash_key.is_empty() || !hash_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CacheError::Persistence(format!(
                "invalid record key: {:?}",
                hash_key
            )));
        }
        Ok(self
            .root
            .join(format!("{}.{}", hash_key, RECORD_EXTENSION)))
    }

    /// Unique scratch path for one write of `hash_key`.
    fn temp_path(&self, hash_key: &str) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            "{}.{}-{}.{}",
            hash_key,
            process::id(),
            seq,
            TEMP_EXTENSION
        ))
    }
}

#[async_trait]
impl PersistenceAdapter for FileStore {
    async fn write(&self, hash_key: &str, stored_text: &str) -> Result<()> {
        let path = self.record_path(hash_key)?;
        fs::create_dir_all(&self.root).await?;

        // concurrent writers to one key each rename their own file; last rename wins
        let tmp = self.temp_path(hash_key);
        fs::write(&tmp, stored_text).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Persisted record {} ({} bytes)", hash_key, stored_text.len());
        Ok(())
    }

    async fn read(&self, hash_key: &str) -> Result<Option<String>> {
        let path = self.record_path(hash_key)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, hash_key: &str) -> Result<()> {
        let path = self.record_path(hash_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
