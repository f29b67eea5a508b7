//! Candidate types shared by the scoring sources.

use data_loader::ProgramId;
use serde::Serialize;

/// Which source produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CandidateSource {
    /// Text similarity between interests and program description/tags
    Content,
    /// Predicted affinity from the factorized user/item model
    Collaborative,
}

/// A program scored by one source.
///
/// Score scale depends on `source`: content scores are cosine similarities
/// in [0, 1], collaborative scores are unbounded dot products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub program_id: ProgramId,
    pub source: CandidateSource,
    pub score: f32,
    pub explanation: Option<String>,
}

impl ScoredCandidate {
    pub fn new(program_id: impl Into<ProgramId>, source: CandidateSource, score: f32) -> Self {
        Self {
            program_id: program_id.into(),
            source,
            score,
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}
