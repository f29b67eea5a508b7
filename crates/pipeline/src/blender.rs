//! Hybrid blending of content and collaborative rankings.
//!
//! ## Algorithm
//! 1. Union the two rankings: content order first, then collaborative-only
//!    programs in collaborative order
//! 2. Normalize collaborative scores by the largest one in the union
//!    (zero when that maximum is not positive)
//! 3. Blend `content * w_content + normalized * w_collaborative`, or use the
//!    content score alone when no collaborative score exists (cold start)
//! 4. Stable sort descending, so ties keep union order
//! 5. Run the filter pipeline (relevance threshold) and take the first k
//! 6. If fewer than k survive, take the first k of the unfiltered ranking
//!
//! Step 6 can return programs below the relevance threshold. They are not
//! marked as such.

use crate::filter_pipeline::FilterPipeline;
use crate::filters::RelevanceThresholdFilter;
use crate::traits::Filter;
use anyhow::{Result, ensure};
use data_loader::ProgramId;
use serde::Serialize;
use sources::ScoredCandidate;
use std::collections::HashMap;
use tracing::debug;

/// Default weight of the content score
pub const DEFAULT_CONTENT_WEIGHT: f32 = 0.6;

/// Default weight of the normalized collaborative score
pub const DEFAULT_COLLABORATIVE_WEIGHT: f32 = 0.4;

/// Blended scores must be strictly above this to pass the relevance filter
pub const DEFAULT_MIN_RELEVANCE: f32 = 0.01;

const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

/// Weights for combining the two signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendWeights {
    pub content: f32,
    pub collaborative: f32,
}

impl BlendWeights {
    /// Validated weights
    pub fn new(content: f32, collaborative: f32) -> Result<Self> {
        let weights = Self {
            content,
            collaborative,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Weights must be finite, non-negative and sum to 1.0
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.content.is_finite() && self.collaborative.is_finite(),
            "Blend weights must be finite (got {} / {})",
            self.content,
            self.collaborative
        );
        ensure!(
            self.content >= 0.0 && self.collaborative >= 0.0,
            "Blend weights must be non-negative (got {} / {})",
            self.content,
            self.collaborative
        );
        let sum = self.content + self.collaborative;
        ensure!(
            (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
            "Blend weights must sum to 1.0 (got {})",
            sum
        );
        Ok(())
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            content: DEFAULT_CONTENT_WEIGHT,
            collaborative: DEFAULT_COLLABORATIVE_WEIGHT,
        }
    }
}

/// One program after blending.
///
/// `score` is only comparable to other blended scores from the same call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedCandidate {
    pub program_id: ProgramId,
    /// Zero when the content ranking did not include this program
    pub content_score: f32,
    /// Raw (unnormalized) collaborative score, if the program was ranked
    pub collaborative_score: Option<f32>,
    pub score: f32,
    /// Content explanation, if the content ranking produced one
    pub explanation: Option<String>,
}

/// Merges content and collaborative rankings into one list
#[derive(Debug)]
pub struct HybridBlender {
    weights: BlendWeights,
    min_relevance: f32,
    filters: FilterPipeline,
}

impl HybridBlender {
    pub fn new(weights: BlendWeights) -> Self {
        Self {
            weights,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            filters: FilterPipeline::new()
                .add_filter(RelevanceThresholdFilter::new(DEFAULT_MIN_RELEVANCE)),
        }
    }

    /// Replace the relevance threshold. Any extra filters are dropped.
    pub fn with_min_relevance(mut self, min_relevance: f32) -> Self {
        self.min_relevance = min_relevance;
        self.filters =
            FilterPipeline::new().add_filter(RelevanceThresholdFilter::new(min_relevance));
        self
    }

    /// Run an extra filter after the relevance threshold
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters = self.filters.add_filter(filter);
        self
    }

    pub fn weights(&self) -> BlendWeights {
        self.weights
    }

    pub fn min_relevance(&self) -> f32 {
        self.min_relevance
    }

    /// Blend the two rankings and return at most `k` programs.
    ///
    /// Returns exactly `k` whenever the union holds at least `k` programs.
    pub fn blend(
        &self,
        content: Vec<ScoredCandidate>,
        collaborative: Vec<ScoredCandidate>,
        k: usize,
    ) -> Vec<BlendedCandidate> {
        if k == 0 {
            return Vec::new();
        }

        let mut ranked = union(content, collaborative);
        self.score(&mut ranked);
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut relevant = self.filters.apply(ranked.clone());
        if relevant.len() >= k {
            relevant.truncate(k);
            return relevant;
        }

        debug!(
            "Only {} of {} blended candidates are relevant, falling back to unfiltered top {}",
            relevant.len(),
            ranked.len(),
            k
        );
        ranked.truncate(k);
        ranked
    }

    fn score(&self, candidates: &mut [BlendedCandidate]) {
        let max_collaborative = candidates
            .iter()
            .filter_map(|c| c.collaborative_score)
            .reduce(f32::max);

        let Some(max_collaborative) = max_collaborative else {
            // Cold start: the content score passes through unchanged
            for candidate in candidates.iter_mut() {
                candidate.score = candidate.content_score;
            }
            return;
        };

        for candidate in candidates.iter_mut() {
            let normalized = if max_collaborative > 0.0 {
                candidate.collaborative_score.unwrap_or(0.0) / max_collaborative
            } else {
                0.0
            };
            candidate.score = self.weights.content * candidate.content_score
                + self.weights.collaborative * normalized;
        }
    }
}

impl Default for HybridBlender {
    fn default() -> Self {
        Self::new(BlendWeights::default())
    }
}

/// Union of both rankings in insertion order; a program seen twice keeps its
/// first score from each side
fn union(content: Vec<ScoredCandidate>, collaborative: Vec<ScoredCandidate>) -> Vec<BlendedCandidate> {
    let mut merged: Vec<BlendedCandidate> = Vec::with_capacity(content.len() + collaborative.len());
    let mut positions: HashMap<ProgramId, usize> = HashMap::new();

    for candidate in content {
        if positions.contains_key(&candidate.program_id) {
            continue;
        }
        positions.insert(candidate.program_id.clone(), merged.len());
        merged.push(BlendedCandidate {
            program_id: candidate.program_id,
            content_score: candidate.score,
            collaborative_score: None,
            score: 0.0,
            explanation: candidate.explanation,
        });
    }

    for candidate in collaborative {
        match positions.get(&candidate.program_id) {
            Some(&position) => {
                let existing = &mut merged[position];
                if existing.collaborative_score.is_none() {
                    existing.collaborative_score = Some(candidate.score);
                }
            }
            None => {
                positions.insert(candidate.program_id.clone(), merged.len());
                merged.push(BlendedCandidate {
                    program_id: candidate.program_id,
                    content_score: 0.0,
                    collaborative_score: Some(candidate.score),
                    score: 0.0,
                    explanation: None,
                });
            }
        }
    }

    merged
}
