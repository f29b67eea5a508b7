//! Collaborative Source - Latent Factor Affinity
//!
//! "Users with similar interests also liked this program."
//!
//! ## Algorithm
//! 1. Look up the user's factor row (unknown user: cold start, no candidates)
//! 2. Dot product against every item factor row (in parallel)
//! 3. Select the k highest scores; ties go to the lower item column
//! 4. Map each column back to its program id, skipping unmapped columns
//!
//! Scores are not thresholded. A negative affinity still ranks below a
//! less negative one.

use crate::explanation::COLLABORATIVE_EXPLANATION;
use crate::types::{CandidateSource, ScoredCandidate};
use data_loader::CollaborativeModel;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Collaborative source for one scoring call
#[derive(Debug, Clone, Copy)]
pub struct CollaborativeSource<'a> {
    model: &'a CollaborativeModel,
}

impl<'a> CollaborativeSource<'a> {
    pub fn new(model: &'a CollaborativeModel) -> Self {
        Self { model }
    }

    /// Top `k` programs for `user_id` by predicted affinity.
    ///
    /// Empty for a user the model has never seen.
    #[instrument(skip(self))]
    pub fn rank(&self, user_id: &str, k: usize) -> Vec<ScoredCandidate> {
        let Some(scores) = self.predicted_scores(user_id) else {
            debug!("User {} not in collaborative model (cold start)", user_id);
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        let candidates: Vec<ScoredCandidate> = ranked
            .into_iter()
            .filter_map(|(column, score)| {
                let Some(program_id) = self.model.program_id_at(column) else {
                    debug!("Item column {} has no program id, skipping", column);
                    return None;
                };
                Some(
                    ScoredCandidate::new(program_id.clone(), CandidateSource::Collaborative, score)
                        .with_explanation(COLLABORATIVE_EXPLANATION),
                )
            })
            .collect();

        debug!("Generated {} collaborative candidates", candidates.len());
        candidates
    }

    /// Predicted affinity of `user_id` for every item column, or `None`
    /// for an unknown user
    pub fn predicted_scores(&self, user_id: &str) -> Option<Vec<f32>> {
        let user_row = self.model.user_index(user_id)?;
        let user = self.model.user_factors().row(user_row);
        let items = self.model.item_factors();

        Some(
            (0..items.rows())
                .into_par_iter()
                .map(|item| dot(user, items.row(item)))
                .collect(),
        )
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
