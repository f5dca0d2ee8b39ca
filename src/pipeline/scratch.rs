//! Scratch storage for transient per-page images.
//!
//! Each guard owns a unique per-run subdirectory of the configured scratch
//! root, so concurrent runs sharing a config never collide on page paths.
//! Cleanup is guaranteed, not best-effort: the guard drains its files and
//! removes its subdirectory in `Drop`, so success, abort, and panic paths
//! all release disk artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use super::PipelineError;

/// Monotonic discriminator for run directories within one process.
static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// RAII guard over the scratch directory used by one pipeline run.
#[derive(Debug)]
pub struct ScratchDir {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl ScratchDir {
    /// Create a unique per-run subdirectory under `root`, creating the
    /// root itself if absent. The subdirectory name combines the process
    /// id with a process-local counter, so two live guards never share
    /// a path.
    pub fn create(root: &Path) -> Result<Self, PipelineError> {
        fs::create_dir_all(root)?;
        let run_id = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = root.join(format!("run_{}_{run_id}", std::process::id()));
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    /// Write one rendered page image as `page_{n}.png` (1-based).
    pub fn write_page(
        &mut self,
        page_number: usize,
        png_bytes: &[u8],
    ) -> Result<PathBuf, PipelineError> {
        let path = self.dir.join(format!("page_{page_number}.png"));
        fs::write(&path, png_bytes)?;
        self.files.push(path.clone());
        Ok(path)
    }

    /// Remove every file this run wrote and the run's subdirectory.
    /// Idempotent; also runs on `Drop`.
    pub fn drain(&mut self) {
        for path in self.files.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
                }
            }
        }
        if let Err(e) = fs::remove_dir(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %self.dir.display(), error = %e, "Failed to remove scratch directory");
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.drain();
    }
}
