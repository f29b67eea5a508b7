//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "artifacts": { "collaborative_model": "/srv/models/cf_svd.json" },
//!   "content_weight": 0.7,
//!   "collaborative_weight": 0.3
//! }
//! ```

use anyhow::{Context, Result, ensure};
use data_loader::ArtifactPaths;
use pipeline::{
    BlendWeights, DEFAULT_COLLABORATIVE_WEIGHT, DEFAULT_CONTENT_WEIGHT, DEFAULT_MIN_RELEVANCE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of candidates each source ranks before blending
pub const DEFAULT_CANDIDATE_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub artifacts: ArtifactPaths,
    pub content_weight: f32,
    pub collaborative_weight: f32,
    pub min_relevance: f32,
    pub candidate_window: usize,
}

impl EngineConfig {
    /// Read and validate a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Use the default artifact layout under `root`
    pub fn with_artifact_root(mut self, root: &Path) -> Self {
        self.artifacts = ArtifactPaths::from_root(root);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.blend_weights()?;
        ensure!(
            self.min_relevance.is_finite(),
            "min_relevance must be finite (got {})",
            self.min_relevance
        );
        ensure!(self.candidate_window > 0, "candidate_window must be at least 1");
        Ok(())
    }

    pub fn blend_weights(&self) -> Result<BlendWeights> {
        BlendWeights::new(self.content_weight, self.collaborative_weight)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            content_weight: DEFAULT_CONTENT_WEIGHT,
            collaborative_weight: DEFAULT_COLLABORATIVE_WEIGHT,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.content_weight, 0.6);
        assert_eq!(config.collaborative_weight, 0.4);
        assert_eq!(config.min_relevance, 0.01);
        assert_eq!(config.candidate_window, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_artifact_override() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"artifacts": {"catalog": "/tmp/programs.csv"}}"#).unwrap();
        assert_eq!(config.artifacts.catalog, Path::new("/tmp/programs.csv"));
        assert_eq!(config.artifacts.vectorizer, ArtifactPaths::default().vectorizer);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.content_weight = 0.9;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.candidate_window = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.min_relevance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"content_weight": 0.7, "collaborative_weight": 0.3}"#).unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.content_weight, 0.7);
        assert_eq!(config.candidate_window, DEFAULT_CANDIDATE_WINDOW);

        std::fs::write(&path, r#"{"content_weight": 0.2}"#).unwrap();
        assert!(EngineConfig::from_file(&path).is_err());
        assert!(EngineConfig::from_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_with_artifact_root() {
        let config = EngineConfig::default().with_artifact_root(Path::new("/srv/recs"));
        assert_eq!(
            config.artifacts.collaborative_model,
            Path::new("/srv/recs/models/cf_svd.json")
        );
    }
}
