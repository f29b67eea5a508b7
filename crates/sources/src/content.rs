//! Content Source - Text Similarity
//!
//! Ranks every program by cosine similarity between the user's interests
//! and the program's row of the similarity matrix.
//!
//! ## Algorithm
//! 1. Transform the interests text with the fitted vectorizer
//! 2. Cosine similarity against every matrix row (in parallel)
//! 3. Stable sort by score descending, so ties keep catalog order
//! 4. Drop non-positive scores
//! 5. Take the first k and explain each match
//!
//! The whole catalog is scored on every call; there is no index.

use crate::explanation::explain_content_match;
use crate::types::{CandidateSource, ScoredCandidate};
use data_loader::{Catalog, ContentModel, SparseVector};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Content source for one scoring call.
///
/// Only constructible from a loaded [`ContentModel`], so a missing
/// vectorizer or matrix is handled before this type is reached.
#[derive(Debug, Clone, Copy)]
pub struct ContentSource<'a> {
    model: &'a ContentModel,
    catalog: &'a Catalog,
}

impl<'a> ContentSource<'a> {
    pub fn new(model: &'a ContentModel, catalog: &'a Catalog) -> Self {
        Self { model, catalog }
    }

    /// Rank programs against `interests`, returning at most `k`.
    ///
    /// Returns fewer than `k` when fewer programs have a positive score.
    /// Never pads with zero-score programs.
    #[instrument(skip(self, interests))]
    pub fn rank(&self, interests: &str, k: usize) -> Vec<ScoredCandidate> {
        let scores = self.similarities(interests);

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let candidates: Vec<ScoredCandidate> = ranked
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .take(k)
            .filter_map(|(position, score)| {
                let program = self.catalog.get(position)?;
                Some(
                    ScoredCandidate::new(program.id.clone(), CandidateSource::Content, score)
                        .with_explanation(explain_content_match(interests, program)),
                )
            })
            .collect();

        debug!("Generated {} content candidates", candidates.len());
        candidates
    }

    /// Cosine similarity of `interests` to every program, in catalog order
    pub fn similarities(&self, interests: &str) -> Vec<f32> {
        let query = self.model.vectorizer().transform(interests);
        let query_norm = query.norm();
        let matrix = self.model.matrix();
        let row_norms = self.model.row_norms();

        (0..matrix.rows())
            .into_par_iter()
            .map(|row| cosine_similarity(&query, query_norm, matrix.row(row), row_norms[row]))
            .collect()
    }
}

/// Cosine similarity; zero when either vector has zero length
fn cosine_similarity(query: &SparseVector, query_norm: f32, row: &[f32], row_norm: f32) -> f32 {
    if query_norm == 0.0 || row_norm == 0.0 {
        return 0.0;
    }
    query.dot(row) / (query_norm * row_norm)
}
