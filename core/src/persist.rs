use crate::error::{Result, SearchError};
use crate::IndexSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Write `snapshot` to `path` as a single bincode blob, replacing any
/// existing file and creating parent directories.
pub fn save_index(snapshot: &IndexSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let bytes = bincode::serialize(snapshot)?;
    let mut f = File::create(path)?;
    f.write_all(&bytes)?;
    tracing::info!(path = %path.display(), num_docs = snapshot.total_docs, bytes = bytes.len(), "index saved");
    Ok(())
}

/// Read a snapshot from `path`, bypassing any cache.
pub fn load_index(path: &Path) -> Result<IndexSnapshot> {
    let mut f = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SearchError::NotFound { path: path.to_path_buf() },
        _ => SearchError::Io(e),
    })?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let snapshot = bincode::deserialize(&buf)?;
    Ok(snapshot)
}

/// Snapshots keyed by path, loaded once and kept until the cache is dropped.
///
/// There is no invalidation: an index rebuilt at a cached path is not seen
/// until a fresh cache is created.
#[derive(Default)]
pub struct IndexCache {
    loaded: RwLock<HashMap<PathBuf, Arc<IndexSnapshot>>>,
}

impl IndexCache {
    pub fn new() -> Self { Self::default() }

    pub fn load(&self, path: &Path) -> Result<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.loaded.read().get(path) {
            return Ok(snapshot.clone());
        }
        // Deserialize under the write lock so concurrent first loads of one
        // path read the file once.
        let mut loaded = self.loaded.write();
        if let Some(snapshot) = loaded.get(path) {
            return Ok(snapshot.clone());
        }
        let snapshot = Arc::new(load_index(path)?);
        tracing::info!(path = %path.display(), num_docs = snapshot.total_docs, "index loaded");
        loaded.insert(path.to_path_buf(), snapshot.clone());
        Ok(snapshot)
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.loaded.read().contains_key(path)
    }
}
