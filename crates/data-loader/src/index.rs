//! Building [`Artifacts`] from the on-disk layout.
//!
//! Default layout under a root directory:
//! - models/tfidf.json          (vectorizer)
//! - models/program_tfidf.json  (similarity matrix)
//! - models/cf_svd.json         (collaborative model)
//! - data/raw/programs.csv      (catalog)

use crate::error::Result;
use crate::parser;
use crate::types::*;
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Location of each artifact file.
///
/// Fields missing from a deserialized value take the default layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub similarity_matrix: PathBuf,
    pub collaborative_model: PathBuf,
    pub catalog: PathBuf,
}

impl ArtifactPaths {
    /// Default layout rooted at `root`
    pub fn from_root(root: &Path) -> Self {
        let models = root.join("models");
        Self {
            vectorizer: models.join("tfidf.json"),
            similarity_matrix: models.join("program_tfidf.json"),
            collaborative_model: models.join("cf_svd.json"),
            catalog: root.join("data").join("raw").join("programs.csv"),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::from_root(Path::new("."))
    }
}

impl Artifacts {
    /// Load every artifact named in `paths`.
    ///
    /// Steps:
    /// 1. Read the four files in parallel (absent files come back as `None`)
    /// 2. Assemble the content model if both vectorizer and matrix exist
    /// 3. Validate alignment with the catalog
    pub fn load_from_paths(paths: &ArtifactPaths) -> Result<Self> {
        let start = Instant::now();
        info!("Loading artifacts");

        let ((vectorizer, matrix), (collaborative, catalog)) = rayon::join(
            || {
                rayon::join(
                    || parser::read_json_artifact::<TfidfVectorizer>(&paths.vectorizer),
                    || parser::read_json_artifact::<DenseMatrix>(&paths.similarity_matrix),
                )
            },
            || {
                rayon::join(
                    || parser::read_json_artifact::<CollaborativeModel>(&paths.collaborative_model),
                    || parser::parse_catalog(&paths.catalog),
                )
            },
        );

        let vectorizer = vectorizer?;
        let matrix = matrix?;
        let collaborative = collaborative?;
        let catalog = match catalog? {
            Some(programs) => Catalog::new(programs)?,
            None => {
                warn!("No catalog found, using an empty catalog");
                Catalog::default()
            }
        };

        let content = match (vectorizer, matrix) {
            (Some(vectorizer), Some(matrix)) => Some(ContentModel::new(vectorizer, matrix)?),
            (Some(_), None) => {
                warn!("Vectorizer present without similarity matrix, content scoring disabled");
                None
            }
            (None, Some(_)) => {
                warn!("Similarity matrix present without vectorizer, content scoring disabled");
                None
            }
            (None, None) => None,
        };

        if let Some(model) = &collaborative {
            let unknown = model
                .item_ids()
                .filter(|id| catalog.get_by_id(id).is_none())
                .count();
            if unknown > 0 {
                warn!("{} collaborative item ids are not in the catalog", unknown);
            }
        }

        let artifacts = Artifacts::new(catalog, content, collaborative)?;
        let capabilities = artifacts.capabilities();
        info!(
            "Loaded {} programs (content: {}, collaborative: {}) in {:?}",
            artifacts.catalog().len(),
            capabilities.content,
            capabilities.collaborative,
            start.elapsed()
        );
        Ok(artifacts)
    }
}
