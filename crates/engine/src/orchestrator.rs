//! # Recommendation Engine
//!
//! This module coordinates one scoring call:
//! 1. Ensure artifacts are loaded (idempotent)
//! 2. Rank a wide window of programs by content similarity
//! 3. Rank a wide window by collaborative affinity, if a user id was given
//! 4. Blend, filter and fall back to k results
//! 5. Resolve catalog details and explanations
//!
//! The engine is an ordinary value. Share it behind an `Arc` (or clone it)
//! to serve concurrent callers; scoring only reads the loaded artifacts.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use data_loader::{ArtifactStore, Artifacts, Capabilities, Catalog, ProgramId};
use pipeline::{BlendedCandidate, HybridBlender};
use sources::{CollaborativeSource, ContentSource, HYBRID_EXPLANATION, ScoredCandidate};

/// Result count used when the caller does not pick one
pub const DEFAULT_K: usize = 5;

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRecommendation {
    pub program_id: ProgramId,
    pub name: String,
    pub description: String,
    pub tags: String,
    pub score: f32,
    pub explanation: String,
}

/// Hybrid recommendation service over one artifact store
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    store: Arc<ArtifactStore>,
    blender: Arc<HybridBlender>,
    candidate_window: usize,
}

impl RecommendationEngine {
    /// Create an engine that loads artifacts from `config.artifacts`.
    ///
    /// Nothing is read from disk until [`load`](Self::load) or the first
    /// scoring call.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let store = Arc::new(ArtifactStore::from_paths(config.artifacts.clone()));
        Self::with_store(store, &config)
    }

    /// Create an engine over an existing store
    pub fn with_store(store: Arc<ArtifactStore>, config: &EngineConfig) -> Result<Self> {
        config.validate().context("Invalid engine configuration")?;
        let blender = HybridBlender::new(config.blend_weights()?)
            .with_min_relevance(config.min_relevance);

        Ok(Self {
            store,
            blender: Arc::new(blender),
            candidate_window: config.candidate_window,
        })
    }

    /// Load artifacts now and report which signals are available
    pub fn load(&self) -> Result<Capabilities> {
        let capabilities = self.artifacts()?.capabilities();
        if !capabilities.content {
            warn!("Content artifacts unavailable, content rankings will be empty");
        }
        if !capabilities.collaborative {
            warn!("Collaborative model unavailable, every user is a cold start");
        }
        Ok(capabilities)
    }

    pub fn capabilities(&self) -> Result<Capabilities> {
        Ok(self.artifacts()?.capabilities())
    }

    pub fn catalog(&self) -> Result<&Catalog> {
        Ok(self.artifacts()?.catalog())
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Top `k` programs by content similarity to `interests`.
    ///
    /// Empty when content artifacts are absent; check
    /// [`capabilities`](Self::capabilities) to tell that apart from
    /// "no matches".
    pub fn content_recommendations(&self, interests: &str, k: usize) -> Result<Vec<ScoredCandidate>> {
        let artifacts = self.artifacts()?;
        Ok(content_ranking(artifacts, interests, k))
    }

    /// Top `k` programs by predicted affinity for `user_id`.
    ///
    /// Empty for an unknown user or when the model is absent.
    pub fn collaborative_recommendations(
        &self,
        user_id: &str,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>> {
        let artifacts = self.artifacts()?;
        Ok(collaborative_ranking(artifacts, user_id, k))
    }

    /// Main entry point: blended recommendations
    ///
    /// # Arguments
    /// * `interests` - Comma-separated free-text interests
    /// * `user_id` - Known user id, if any (blank counts as none)
    /// * `k` - Number of recommendations to return
    ///
    /// # Returns
    /// At most `k` recommendations, highest blended score first. Exactly
    /// `k` whenever the two rankings together hold at least `k` programs.
    pub fn hybrid_recommendations(
        &self,
        interests: &str,
        user_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<ProgramRecommendation>> {
        let start_time = Instant::now();
        let artifacts = self.artifacts()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        // The window must not starve the final top k
        let window = self.candidate_window.max(k);
        let user_id = user_id.filter(|id| !id.trim().is_empty());

        let content = content_ranking(artifacts, interests, window);
        let collaborative = match user_id {
            Some(user_id) => in_catalog(
                artifacts.catalog(),
                collaborative_ranking(artifacts, user_id, window),
            ),
            None => Vec::new(),
        };
        debug!(
            "Ranked {} content and {} collaborative candidates",
            content.len(),
            collaborative.len()
        );

        let blended = self.blender.blend(content, collaborative, k);
        let recommendations = resolve(artifacts.catalog(), blended);

        info!(
            "Produced {} hybrid recommendations (user: {}) in {:.2?}",
            recommendations.len(),
            user_id.unwrap_or("-"),
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    fn artifacts(&self) -> Result<&Artifacts> {
        self.store
            .ensure_loaded()
            .context("Failed to load recommendation artifacts")
    }
}

fn content_ranking(artifacts: &Artifacts, interests: &str, k: usize) -> Vec<ScoredCandidate> {
    match artifacts.content() {
        Some(model) => ContentSource::new(model, artifacts.catalog()).rank(interests, k),
        None => {
            debug!("No content model loaded, skipping content ranking");
            Vec::new()
        }
    }
}

fn collaborative_ranking(artifacts: &Artifacts, user_id: &str, k: usize) -> Vec<ScoredCandidate> {
    match artifacts.collaborative() {
        Some(model) => CollaborativeSource::new(model).rank(user_id, k),
        None => {
            debug!("No collaborative model loaded, skipping collaborative ranking");
            Vec::new()
        }
    }
}

/// Drop candidates the catalog cannot resolve, so they never take one of
/// the k blended slots
fn in_catalog(catalog: &Catalog, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let known = catalog.get_by_id(&candidate.program_id).is_some();
            if !known {
                warn!("Program {} is not in the catalog, skipping", candidate.program_id);
            }
            known
        })
        .collect()
}

/// Attach catalog details; programs missing from the catalog are dropped
fn resolve(catalog: &Catalog, blended: Vec<BlendedCandidate>) -> Vec<ProgramRecommendation> {
    blended
        .into_iter()
        .filter_map(|candidate| {
            let Some(program) = catalog.get_by_id(&candidate.program_id) else {
                warn!("Program {} is not in the catalog, skipping", candidate.program_id);
                return None;
            };
            Some(ProgramRecommendation {
                program_id: candidate.program_id,
                name: program.name.clone(),
                description: program.description.clone(),
                tags: program.tags_text.clone(),
                score: candidate.score,
                explanation: candidate
                    .explanation
                    .unwrap_or_else(|| HYBRID_EXPLANATION.to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{
        CollaborativeModel, ContentModel, DataLoadError, DenseMatrix, Program, TfidfVectorizer,
    };
    use std::collections::HashMap;

    const VOCABULARY: [&str; 5] = ["python", "data", "analysis", "web", "cooking"];

    fn create_test_artifacts(with_collaborative: bool) -> Artifacts {
        let programs = vec![
            Program::new("P1", "Intro to Python", "Learn python", "Python"),
            Program::new("P2", "Data Analysis", "Analyze data", "Python, Data Analysis"),
            Program::new("P3", "Web Basics", "Build websites", "Web"),
            Program::new("P4", "Cooking", "Home cooking", "Cooking"),
        ];
        let vocabulary: HashMap<String, usize> = VOCABULARY
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        let vectorizer = TfidfVectorizer::new(vocabulary, vec![1.0; VOCABULARY.len()]).unwrap();
        let rows = programs
            .iter()
            .map(|p| vectorizer.transform(&p.match_text).to_dense(VOCABULARY.len()))
            .collect();
        let content =
            ContentModel::new(vectorizer, DenseMatrix::from_rows(rows).unwrap()).unwrap();

        let collaborative = with_collaborative.then(|| {
            CollaborativeModel::new(
                HashMap::from([("u1".to_string(), 0)]),
                HashMap::from([
                    ("P3".to_string(), 0),
                    ("P4".to_string(), 1),
                    ("GONE".to_string(), 2),
                ]),
                DenseMatrix::from_rows(vec![vec![1.0]]).unwrap(),
                DenseMatrix::from_rows(vec![vec![2.0], vec![1.0], vec![3.0]]).unwrap(),
            )
            .unwrap()
        });

        Artifacts::new(Catalog::new(programs).unwrap(), Some(content), collaborative).unwrap()
    }

    fn engine_over(artifacts: Artifacts) -> RecommendationEngine {
        let store = Arc::new(ArtifactStore::preloaded(artifacts));
        RecommendationEngine::with_store(store, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_cold_start_is_pure_content() {
        let engine = engine_over(create_test_artifacts(true));

        let content = engine.content_recommendations("python", 5).unwrap();
        let hybrid = engine.hybrid_recommendations("python", None, 5).unwrap();

        assert_eq!(hybrid.len(), content.len());
        for (recommendation, candidate) in hybrid.iter().zip(&content) {
            assert_eq!(recommendation.program_id, candidate.program_id);
            assert_eq!(recommendation.score, candidate.score);
            assert_eq!(Some(&recommendation.explanation), candidate.explanation.as_ref());
        }
    }

    #[test]
    fn test_blank_user_id_is_none() {
        let engine = engine_over(create_test_artifacts(true));
        let anonymous = engine.hybrid_recommendations("python", None, 5).unwrap();
        let blank = engine.hybrid_recommendations("python", Some("  "), 5).unwrap();
        assert_eq!(anonymous, blank);
    }

    #[test]
    fn test_collaborative_only_program_gets_hybrid_explanation() {
        let engine = engine_over(create_test_artifacts(true));
        let recommendations = engine.hybrid_recommendations("python", Some("u1"), 5).unwrap();

        let web = recommendations.iter().find(|r| r.program_id == "P3").unwrap();
        assert_eq!(web.explanation, HYBRID_EXPLANATION);
        assert_eq!(web.name, "Web Basics");
        assert_eq!(web.tags, "Web");
    }

    #[test]
    fn test_programs_missing_from_catalog_are_skipped() {
        let engine = engine_over(create_test_artifacts(true));

        let collaborative = engine.collaborative_recommendations("u1", 5).unwrap();
        assert_eq!(collaborative[0].program_id, "GONE");

        let recommendations = engine.hybrid_recommendations("", Some("u1"), 5).unwrap();
        assert!(recommendations.iter().all(|r| r.program_id != "GONE"));
        assert_eq!(recommendations.len(), 2);
    }

    #[test]
    fn test_missing_program_does_not_take_a_slot() {
        let engine = engine_over(create_test_artifacts(true));

        // GONE has the best collaborative score but no catalog entry
        let recommendations = engine.hybrid_recommendations("", Some("u1"), 2).unwrap();
        let ids: Vec<&str> = recommendations.iter().map(|r| r.program_id.as_str()).collect();
        assert_eq!(ids, vec!["P3", "P4"]);
    }

    #[test]
    fn test_zero_k() {
        let engine = engine_over(create_test_artifacts(true));
        assert!(engine.hybrid_recommendations("python", Some("u1"), 0).unwrap().is_empty());
        assert!(engine.content_recommendations("python", 0).unwrap().is_empty());
    }

    #[test]
    fn test_absent_collaborative_model() {
        let engine = engine_over(create_test_artifacts(false));
        assert!(!engine.capabilities().unwrap().collaborative);
        assert!(engine.collaborative_recommendations("u1", 5).unwrap().is_empty());

        let hybrid = engine.hybrid_recommendations("cooking", Some("u1"), 5).unwrap();
        assert_eq!(hybrid.len(), 1);
        assert_eq!(hybrid[0].program_id, "P4");
    }

    #[test]
    fn test_load_failure_propagates() {
        let store = Arc::new(ArtifactStore::new(|| -> data_loader::Result<Artifacts> {
            Err(DataLoadError::InvalidVectorizer("corrupt".to_string()))
        }));
        let engine = RecommendationEngine::with_store(store, &EngineConfig::default()).unwrap();

        assert!(engine.load().is_err());
        assert!(engine.hybrid_recommendations("python", None, 5).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            collaborative_weight: 0.9,
            ..EngineConfig::default()
        };
        assert!(RecommendationEngine::new(config).is_err());
    }
}
