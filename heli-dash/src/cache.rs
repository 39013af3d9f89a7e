//! Keep pipeline results around between renders.
//!
//! Entries are keyed on the canonical path of the input file and checked against its
//! modification time (and the H3 resolution used) on every access.  A changed file is
//! reloaded, `invalidate()` and `clear()` drop entries explicitly.
//!

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use eyre::Result;
use h3o::Resolution;
use tracing::{debug, trace};

use crate::config::Settings;
use crate::error::Status;
use crate::pipeline::{run, Bundle};

#[derive(Debug)]
struct Entry {
    modified: SystemTime,
    resolution: Resolution,
    bundle: Arc<Bundle>,
}

#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<PathBuf, Entry>,
    /// Pipeline runs
    loads: usize,
    /// Served from cache
    hits: usize,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the bundle for `fname`, running the pipeline only if needed.
    ///
    #[tracing::instrument(skip(self, settings))]
    pub fn get(&mut self, fname: &Path, settings: &Settings) -> Result<Arc<Bundle>> {
        let key = fname
            .canonicalize()
            .map_err(|_| Status::MissingFile(fname.to_string_lossy().to_string()))?;
        let modified = fs::metadata(&key)?.modified()?;

        if let Some(e) = self.entries.get(&key) {
            if e.modified == modified && e.resolution == settings.resolution {
                trace!("cache hit for {key:?}");
                self.hits += 1;
                return Ok(Arc::clone(&e.bundle));
            }
            debug!("{key:?} changed, reloading");
        }

        let bundle = Arc::new(run(&key, settings)?);
        self.loads += 1;
        self.entries.insert(
            key,
            Entry {
                modified,
                resolution: settings.resolution,
                bundle: Arc::clone(&bundle),
            },
        );
        Ok(bundle)
    }

    /// Forget `fname`, returns whether it was there.
    ///
    pub fn invalidate(&mut self, fname: &Path) -> bool {
        let key = fname
            .canonicalize()
            .unwrap_or_else(|_| fname.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    /// Forget everything.
    ///
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}
