//! Example: Rank programs with each source
//!
//! Run with: cargo run --package sources --example rank_programs -- <root> <interests> [user_id]
//!
//! This example shows how to:
//! 1. Load artifacts from the default layout
//! 2. Rank programs by content similarity
//! 3. Rank programs by collaborative affinity
//! 4. Display the results

use data_loader::{ArtifactPaths, ArtifactStore};
use sources::{CollaborativeSource, ContentSource};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| ".".to_string());
    let interests = args.next().unwrap_or_else(|| "python, data analysis".to_string());
    let user_id = args.next();

    println!("=== Program Ranking Example ===\n");

    let start = Instant::now();
    let store = ArtifactStore::from_paths(ArtifactPaths::from_root(Path::new(&root)));
    let artifacts = store.ensure_loaded()?;
    println!("Loaded artifacts in {:?}\n", start.elapsed());

    match artifacts.content() {
        Some(model) => {
            let start = Instant::now();
            let candidates = ContentSource::new(model, artifacts.catalog()).rank(&interests, 10);
            println!("Content candidates for '{}' ({:?}):", interests, start.elapsed());
            for (i, candidate) in candidates.iter().enumerate() {
                println!("  {}. {} ({:.3})", i + 1, candidate.program_id, candidate.score);
            }
        }
        None => println!("Content artifacts not available"),
    }

    if let Some(user_id) = user_id {
        match artifacts.collaborative() {
            Some(model) => {
                let start = Instant::now();
                let candidates = CollaborativeSource::new(model).rank(&user_id, 10);
                println!("\nCollaborative candidates for {} ({:?}):", user_id, start.elapsed());
                for (i, candidate) in candidates.iter().enumerate() {
                    println!("  {}. {} ({:.3})", i + 1, candidate.program_id, candidate.score);
                }
            }
            None => println!("\nCollaborative model not available"),
        }
    }

    Ok(())
}
