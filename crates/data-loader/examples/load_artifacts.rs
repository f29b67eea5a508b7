use data_loader::{ArtifactPaths, Artifacts};
use std::path::Path;
use std::time::Instant;

fn main() {
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let paths = ArtifactPaths::from_root(Path::new(&root));

    println!("Loading artifacts from {}...\n", root);

    let start = Instant::now();
    let artifacts = Artifacts::load_from_paths(&paths)
        .expect("Failed to load artifacts");
    let elapsed = start.elapsed();

    let capabilities = artifacts.capabilities();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Programs: {}", artifacts.catalog().len());
    println!("Content scoring: {}", capabilities.content);
    if let Some(model) = artifacts.content() {
        println!("  Vocabulary: {} terms", model.vectorizer().vocabulary_size());
    }
    println!("Collaborative scoring: {}", capabilities.collaborative);
    if let Some(model) = artifacts.collaborative() {
        println!("  Users: {}", model.user_ids().count());
        println!("  Latent factors: {}", model.user_factors().cols());
    }
}
