//! Filter to drop candidates with negligible blended scores.

use crate::blender::BlendedCandidate;
use crate::traits::Filter;

/// Keeps candidates whose blended score is strictly above `threshold`.
pub struct RelevanceThresholdFilter {
    threshold: f32,
}

impl RelevanceThresholdFilter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Filter for RelevanceThresholdFilter {
    fn name(&self) -> &str {
        "RelevanceThresholdFilter"
    }

    fn apply(&self, candidates: Vec<BlendedCandidate>) -> Vec<BlendedCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| candidate.score > self.threshold)
            .collect()
    }
}
