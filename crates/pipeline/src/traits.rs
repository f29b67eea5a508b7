//! Core traits for the post-blend pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to blended candidates.

use crate::blender::BlendedCandidate;

/// Core trait for filtering blended candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to serve concurrent calls
/// - Filters take ownership of the Vec and return the kept candidates
/// - Filters must preserve the relative order of what they keep
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a ranked set of candidates.
    fn apply(&self, candidates: Vec<BlendedCandidate>) -> Vec<BlendedCandidate>;
}
