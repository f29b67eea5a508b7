//! # Data Loader Crate
//!
//! This crate owns the offline-trained artifacts the scorers read:
//! the TF-IDF vectorizer, the program similarity matrix, the factorized
//! collaborative model and the program catalog.
//!
//! ## Main Components
//!
//! - **types**: Catalog, matrices, content and collaborative models
//! - **vectorizer**: TF-IDF transform into the fitted vocabulary space
//! - **parser**: Read JSON artifacts and programs.csv
//! - **index**: Assemble and validate [`Artifacts`] from a file layout
//! - **store**: [`ArtifactStore`], the load-once holder shared by callers
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ArtifactPaths, ArtifactStore};
//! use std::path::Path;
//!
//! let store = ArtifactStore::from_paths(ArtifactPaths::from_root(Path::new(".")));
//! let artifacts = store.ensure_loaded()?;
//!
//! println!("{} programs, capabilities {:?}",
//!     artifacts.catalog().len(),
//!     artifacts.capabilities());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod vectorizer;
pub mod parser;
pub mod index;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::ArtifactPaths;
pub use store::{ArtifactLoader, ArtifactStore, FileArtifactLoader};
pub use types::{
    // Type aliases
    ProgramId,
    UserId,
    // Core types
    Artifacts,
    Capabilities,
    Catalog,
    CollaborativeModel,
    ContentModel,
    DenseMatrix,
    Program,
};
pub use vectorizer::{Norm, SparseVector, TfidfVectorizer};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_artifacts() {
        let artifacts = Artifacts::default();
        assert!(artifacts.catalog().is_empty());
        assert!(artifacts.content().is_none());
        assert!(artifacts.collaborative().is_none());
    }

    #[test]
    fn test_build_artifacts_in_memory() {
        let vocabulary: HashMap<String, usize> = [("python".to_string(), 0)].into_iter().collect();
        let vectorizer = TfidfVectorizer::new(vocabulary, vec![1.0]).unwrap();
        let row = vectorizer.transform("python").to_dense(1);
        let matrix = DenseMatrix::from_rows(vec![row]).unwrap();

        let catalog = Catalog::new(vec![Program::new("P1", "Python 101", "Learn python", "Python")]).unwrap();
        let content = ContentModel::new(vectorizer, matrix).unwrap();
        let artifacts = Artifacts::new(catalog, Some(content), None).unwrap();

        assert_eq!(
            artifacts.capabilities(),
            Capabilities { content: true, collaborative: false }
        );
        assert!((artifacts.content().unwrap().row_norms()[0] - 1.0).abs() < 1e-6);
    }
}
