//! Read-through dataset cache keyed by data directory freshness.
//!
//! The cache is owned by the caller (the HTTP state holds one). An entry is
//! valid while the directory's [`DirSignature`] is unchanged. Population is
//! compute-once, publish-once: concurrent misses for the same key serialize
//! on the write lock and all callers receive the same `Arc<Dataset>`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};

use crate::{
    dataset::Dataset,
    error::{DataError, Result},
};

// ---

/// Name, size and modification time of every entry in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSignature(Vec<(String, u64, Option<SystemTime>)>);

impl DirSignature {
    // ---
    pub fn of(dir: &Path) -> Result<Self> {
        // ---
        let entries = fs::read_dir(dir).map_err(|source| DataError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut items = Vec::new();
        for entry in entries.flatten() {
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!("No metadata for {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            items.push((
                entry.file_name().to_string_lossy().into_owned(),
                meta.len(),
                meta.modified().ok(),
            ));
        }
        items.sort();
        Ok(DirSignature(items))
    }
}

struct Entry {
    signature: DirSignature,
    dataset: Arc<Dataset>,
}

/// Caller-owned cache of loaded datasets, one entry per directory.
#[derive(Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl DatasetCache {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `dir`, loading it with `load` if the
    /// directory changed or nothing is cached. Errors are not cached.
    pub fn get_or_load<F>(&self, dir: &Path, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        // ---
        let signature = DirSignature::of(dir)?;

        {
            let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
            if let Some(entry) = entries.get(dir) {
                if entry.signature == signature {
                    tracing::debug!("Cache hit for {}", dir.display());
                    return Ok(Arc::clone(&entry.dataset));
                }
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());

        // Another caller may have populated the entry while we waited
        if let Some(entry) = entries.get(dir) {
            if entry.signature == signature {
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        tracing::debug!("Cache miss for {}, loading", dir.display());
        let dataset = Arc::new(load()?);
        entries.insert(
            dir.to_path_buf(),
            Entry {
                signature,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drop every cached entry.
    pub fn invalidate(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
