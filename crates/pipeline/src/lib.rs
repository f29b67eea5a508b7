//! Pipeline for blending and filtering program candidates.
//!
//! This crate provides:
//! - HybridBlender for merging content and collaborative rankings
//! - Filter trait and implementations for post-blend filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. The blender unions and scores both rankings
//! 2. Filters remove low-relevance candidates
//! 3. The blender falls back to the unfiltered ranking when filtering
//!    leaves fewer than k candidates
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{BlendWeights, HybridBlender};
//!
//! let blender = HybridBlender::new(BlendWeights::new(0.6, 0.4)?)
//!     .with_min_relevance(0.01);
//!
//! let blended = blender.blend(content_candidates, collaborative_candidates, 5);
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod blender;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use blender::{
    BlendWeights, BlendedCandidate, HybridBlender, DEFAULT_COLLABORATIVE_WEIGHT,
    DEFAULT_CONTENT_WEIGHT, DEFAULT_MIN_RELEVANCE,
};
