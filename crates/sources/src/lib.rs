//! # Sources Crate
//!
//! This crate implements the two candidate sources for program
//! recommendations, plus the explanation text attached to each match.
//!
//! ## Components
//!
//! ### Content Source
//! Text similarity between a user's stated interests and each program:
//! - TF-IDF transform of the interests string
//! - Cosine similarity against every row of the similarity matrix
//! - Only positive similarities are returned
//!
//! ### Collaborative Source
//! Predicted affinity from the factorized user/item model:
//! - "Users with similar interests also liked this program"
//! - Unknown users get no candidates (cold start)
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeSource, ContentSource};
//!
//! let artifacts = store.ensure_loaded()?;
//!
//! if let Some(model) = artifacts.content() {
//!     let content = ContentSource::new(model, artifacts.catalog());
//!     let candidates = content.rank("python, data analysis", 20);
//! }
//!
//! if let Some(model) = artifacts.collaborative() {
//!     let collaborative = CollaborativeSource::new(model);
//!     let candidates = collaborative.rank("u42", 20);
//! }
//! ```
//!
//! Both sources borrow the loaded artifacts for the length of one call and
//! never mutate them, so any number of calls can run at once.

// Public modules
pub mod types;
pub mod explanation;
pub mod content;
pub mod collaborative;

// Re-export commonly used types
pub use types::{CandidateSource, ScoredCandidate};
pub use content::ContentSource;
pub use collaborative::CollaborativeSource;
pub use explanation::{
    COLLABORATIVE_EXPLANATION, HYBRID_EXPLANATION, explain_content_match, matched_interests,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_creation() {
        let candidate = ScoredCandidate::new("P1", CandidateSource::Content, 0.85);
        assert_eq!(candidate.program_id, "P1");
        assert_eq!(candidate.source, CandidateSource::Content);
        assert_eq!(candidate.score, 0.85);
        assert!(candidate.explanation.is_none());
    }

    #[test]
    fn test_candidate_with_explanation() {
        let candidate = ScoredCandidate::new("P2", CandidateSource::Collaborative, -0.2)
            .with_explanation(COLLABORATIVE_EXPLANATION);
        assert_eq!(candidate.explanation.as_deref(), Some(COLLABORATIVE_EXPLANATION));
        assert!(candidate.score < 0.0);
    }
}
