//! Transfer/download adapter
//!
//! Output blobs are exported through transient handles: every handle
//! created for a preview or download must be revoked on the path that
//! removes its owning entry, or it leaks. The registry keeps create and
//! revoke counters so flows can assert balance in tests.
//!
//! Batch saves are deliberately staggered by a fixed delay between files;
//! the hosting platform drops exports issued back-to-back.

use crate::error::PrintHubError;
use crate::tools::ToolOutput;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delay between consecutive files in a batch save.
pub const BATCH_STAGGER: Duration = Duration::from_millis(100);

/// Tracks transient blob handles and their lifecycle counts.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    active: BTreeMap<u64, Vec<u8>>,
    created: u64,
    revoked: u64,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return its handle.
    pub fn create(&mut self, bytes: Vec<u8>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.created += 1;
        self.active.insert(id, bytes);
        id
    }

    /// Access a live handle's bytes. Revoked handles yield `None`.
    pub fn get(&self, handle: u64) -> Option<&[u8]> {
        self.active.get(&handle).map(|b| b.as_slice())
    }

    /// Release a handle. Returns false if it was already revoked.
    pub fn revoke(&mut self, handle: u64) -> bool {
        if self.active.remove(&handle).is_some() {
            self.revoked += 1;
            true
        } else {
            false
        }
    }

    /// Release everything still live.
    pub fn revoke_all(&mut self) {
        let ids: Vec<u64> = self.active.keys().copied().collect();
        for id in ids {
            self.revoke(id);
        }
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// True when every created handle has been revoked.
    pub fn is_balanced(&self) -> bool {
        self.created == self.revoked && self.active.is_empty()
    }
}

/// Writes tool outputs to a destination directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    stagger: Duration,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            stagger: BATCH_STAGGER,
        }
    }

    /// Mostly for tests: a downloader without the inter-file delay.
    pub fn with_stagger(stagger: Duration) -> Self {
        Self { stagger }
    }

    /// Write one output blob into `dir` under its suggested filename.
    pub fn save(&self, output: &ToolOutput, dir: &Path) -> Result<PathBuf, PrintHubError> {
        let path = dir.join(&output.name);
        std::fs::write(&path, &output.bytes)?;
        tracing::debug!(file = %path.display(), size = output.size(), "saved output");
        Ok(path)
    }

    /// Write every output in order, pausing between files.
    pub fn save_all(
        &self,
        outputs: &[ToolOutput],
        dir: &Path,
    ) -> Result<Vec<PathBuf>, PrintHubError> {
        let mut paths = Vec::with_capacity(outputs.len());
        for (i, output) in outputs.iter().enumerate() {
            if i > 0 && !self.stagger.is_zero() {
                std::thread::sleep(self.stagger);
            }
            paths.push(self.save(output, dir)?);
        }
        Ok(paths)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}
