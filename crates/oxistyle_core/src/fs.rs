//! Filesystem access used by resolution and loading.
//!
//! Two implementations are provided:
//! - [`RealFs`]: the host filesystem through `tokio::fs`
//! - [`MemoryFs`]: an in-memory file map that records every probe, so the
//!   exact probe order of a resolution can be asserted on

use log::trace;
use std::{
    collections::{HashMap, HashSet},
    future::Future,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

/// Outcome of checking a path for existence.
#[derive(Debug)]
pub enum Probe {
    Found,
    Absent,
    /// The check itself failed (permission denied, path too long, ...)
    Failed(io::Error),
}

impl Probe {
    fn from_io<T>(result: io::Result<T>) -> Self {
        match result {
            Ok(_) => Probe::Found,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Probe::Absent,
            Err(e) => Probe::Failed(e),
        }
    }
}

pub trait FileSystem: Send + Sync {
    fn probe(&self, path: &Path) -> impl Future<Output = Probe> + Send;

    fn read_to_string(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

/// Existence check that treats a failed probe as "absent".
pub async fn exists<F: FileSystem>(fs: &F, path: &Path) -> bool {
    match fs.probe(path).await {
        Probe::Found => true,
        Probe::Absent => false,
        Probe::Failed(e) => {
            trace!("Probe failed for {}, treating as absent: {}", path.display(), e);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    async fn probe(&self, path: &Path) -> Probe {
        Probe::from_io(tokio::fs::metadata(path).await)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// In-memory filesystem. Directories exist implicitly for every ancestor of an
/// added file. Clones share the probe log.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<PathBuf, String>,
    dirs: HashSet<PathBuf>,
    failing: HashSet<PathBuf>,
    probes: Arc<Mutex<Vec<PathBuf>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            self.dirs.insert(ancestor.to_path_buf());
        }
        self.files.insert(path, content.into());
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        for ancestor in path.ancestors() {
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Makes every probe of `path` fail with a permission error.
    pub fn add_failing(&mut self, path: impl Into<PathBuf>) {
        self.failing.insert(path.into());
    }

    /// Every path probed so far, in order.
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl FileSystem for MemoryFs {
    async fn probe(&self, path: &Path) -> Probe {
        self.probes.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_path_buf());
        if self.failing.contains(path) {
            return Probe::Failed(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        if self.files.contains_key(path) || self.dirs.contains(path) {
            Probe::Found
        } else {
            Probe::Absent
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }
}
