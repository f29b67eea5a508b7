//! Filter implementations for the post-blend pipeline.

pub mod relevance;

pub use relevance::RelevanceThresholdFilter;
