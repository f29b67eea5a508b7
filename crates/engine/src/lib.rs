//! Engine crate for the program recommendation service.
//!
//! This crate contains the engine that coordinates artifact loading, both
//! candidate sources and the hybrid blender, plus its configuration.

pub mod config;
pub mod orchestrator;

pub use config::{DEFAULT_CANDIDATE_WINDOW, EngineConfig};
pub use orchestrator::{DEFAULT_K, ProgramRecommendation, RecommendationEngine};
