//! Load-once, read-many holder for [`Artifacts`].
//!
//! `ensure_loaded` is the only mutation. It is double-checked: the fast
//! path is a lock-free `OnceLock::get`; the slow path takes `init_lock`,
//! checks again, then loads. Concurrent first callers therefore load once
//! and never see a half-built value. A failed load leaves the store empty.

use crate::error::Result;
use crate::index::ArtifactPaths;
use crate::types::Artifacts;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{debug, error};

/// Source of artifacts for an [`ArtifactStore`]
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> Result<Artifacts>;
}

/// Any `Fn() -> Result<Artifacts>` closure is a loader
impl<F> ArtifactLoader for F
where
    F: Fn() -> Result<Artifacts> + Send + Sync,
{
    fn load(&self) -> Result<Artifacts> {
        self()
    }
}

/// Loads artifacts from files on disk
#[derive(Debug, Clone)]
pub struct FileArtifactLoader {
    paths: ArtifactPaths,
}

impl FileArtifactLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }
}

impl ArtifactLoader for FileArtifactLoader {
    fn load(&self) -> Result<Artifacts> {
        Artifacts::load_from_paths(&self.paths)
    }
}

/// Owns the loaded artifacts; every scorer borrows from here
pub struct ArtifactStore {
    loader: Box<dyn ArtifactLoader>,
    artifacts: OnceLock<Artifacts>,
    init_lock: Mutex<()>,
}

impl ArtifactStore {
    pub fn new(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            artifacts: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Store backed by the file layout in `paths`
    pub fn from_paths(paths: ArtifactPaths) -> Self {
        Self::new(FileArtifactLoader::new(paths))
    }

    /// Store that is already loaded with `artifacts`
    pub fn preloaded(artifacts: Artifacts) -> Self {
        let store = Self::new(|| -> Result<Artifacts> { Ok(Artifacts::default()) });
        let _ = store.artifacts.set(artifacts);
        store
    }

    /// Load artifacts on first call; later calls return the same value.
    ///
    /// A load failure is logged and returned to the caller.
    pub fn ensure_loaded(&self) -> Result<&Artifacts> {
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(artifacts);
        }

        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(artifacts) = self.artifacts.get() {
            debug!("Artifacts loaded by another caller");
            return Ok(artifacts);
        }

        match self.loader.load() {
            Ok(artifacts) => Ok(self.artifacts.get_or_init(|| artifacts)),
            Err(e) => {
                error!("Error loading artifacts: {}", e);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Artifacts if already loaded, without triggering a load
    pub fn get(&self) -> Option<&Artifacts> {
        self.artifacts.get()
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataLoadError;
    use crate::types::{Catalog, Program};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_program() -> Artifacts {
        let catalog = Catalog::new(vec![Program::new("P1", "Python 101", "", "Python")]).unwrap();
        Artifacts::new(catalog, None, None).unwrap()
    }

    #[test]
    fn test_ensure_loaded_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = ArtifactStore::new(move || -> Result<Artifacts> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(one_program())
        });

        assert!(!store.is_loaded());
        assert!(store.get().is_none());

        let first = store.ensure_loaded().unwrap().catalog().len();
        let second = store.ensure_loaded().unwrap().catalog().len();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn test_concurrent_first_calls_load_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = Arc::new(ArtifactStore::new(move || -> Result<Artifacts> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(one_program())
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.ensure_loaded().unwrap().catalog().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_failure_is_returned_and_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = ArtifactStore::new(move || -> Result<Artifacts> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(DataLoadError::InvalidVectorizer("corrupt".to_string()))
        });

        assert!(store.ensure_loaded().is_err());
        assert!(!store.is_loaded());
        assert!(store.ensure_loaded().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_preloaded_store() {
        let store = ArtifactStore::preloaded(one_program());
        assert!(store.is_loaded());
        assert_eq!(store.ensure_loaded().unwrap().catalog().len(), 1);
    }
}
