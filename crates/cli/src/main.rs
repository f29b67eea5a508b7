use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::Catalog;
use engine::{EngineConfig, ProgramRecommendation, RecommendationEngine, DEFAULT_K};
use rand::seq::IndexedRandom;
use rand::Rng;
use sources::ScoredCandidate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Program Recs - Hybrid Program Recommendation Engine
#[derive(Parser)]
#[command(name = "program-recs")]
#[command(about = "Program recommendations from content similarity and collaborative filtering", long_about = None)]
struct Cli {
    /// Directory holding models/ and data/raw/ (overrides the config's artifact paths)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSON engine config (weights, threshold, window, artifact paths)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get hybrid recommendations from interests and an optional user id
    Recommend {
        /// Comma-separated interests, e.g. "python, data analysis"
        #[arg(long)]
        interests: String,

        /// Known user id for collaborative scoring
        #[arg(long)]
        user_id: Option<String>,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_K)]
        limit: usize,

        /// Show the explanation for each recommendation
        #[arg(long)]
        explain: bool,

        /// Print recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank programs by content similarity only
    Content {
        #[arg(long)]
        interests: String,

        #[arg(long, default_value_t = DEFAULT_K)]
        limit: usize,
    },

    /// Rank programs by collaborative affinity only
    Collaborative {
        #[arg(long)]
        user_id: String,

        #[arg(long, default_value_t = DEFAULT_K)]
        limit: usize,
    },

    /// Search the catalog by program name or tags
    Search {
        /// Text to search for (case-insensitive substring match)
        #[arg(long)]
        query: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(cli.root, cli.config)?;

    println!("Loading artifacts...");
    let start = Instant::now();
    let engine = RecommendationEngine::new(config)?;
    let capabilities = engine.load().context("Failed to load recommendation artifacts")?;
    println!(
        "{} Loaded {} programs in {:?} (content: {}, collaborative: {})",
        "✓".green(),
        engine.catalog()?.len(),
        start.elapsed(),
        availability(capabilities.content),
        availability(capabilities.collaborative)
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            interests,
            user_id,
            limit,
            explain,
            json,
        } => handle_recommend(&engine, &interests, user_id.as_deref(), limit, explain, json)?,
        Commands::Content { interests, limit } => handle_content(&engine, &interests, limit)?,
        Commands::Collaborative { user_id, limit } => {
            handle_collaborative(&engine, &user_id, limit)?
        }
        Commands::Search { query } => handle_search(engine.catalog()?, &query),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, requests, concurrent).await?,
    }

    Ok(())
}

fn build_config(root: Option<PathBuf>, config: Option<PathBuf>) -> Result<EngineConfig> {
    let config = match config {
        Some(path) => EngineConfig::from_file(&path)?,
        None => EngineConfig::default(),
    };
    Ok(match root {
        Some(root) => config.with_artifact_root(&root),
        None => config,
    })
}

fn availability(available: bool) -> colored::ColoredString {
    if available {
        "available".green()
    } else {
        "absent".yellow()
    }
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    interests: &str,
    user_id: Option<&str>,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    let recommendations = engine.hybrid_recommendations(interests, user_id, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(&recommendations, explain);
    }
    Ok(())
}

/// Handle the 'content' command
fn handle_content(engine: &RecommendationEngine, interests: &str, limit: usize) -> Result<()> {
    if !engine.capabilities()?.content {
        bail!("Content artifacts are not available");
    }
    let candidates = engine.content_recommendations(interests, limit)?;
    println!("{}", format!("Content matches for '{}':", interests).bold().blue());
    print_candidates(engine.catalog()?, &candidates);
    Ok(())
}

/// Handle the 'collaborative' command
fn handle_collaborative(engine: &RecommendationEngine, user_id: &str, limit: usize) -> Result<()> {
    if !engine.capabilities()?.collaborative {
        bail!("Collaborative model is not available");
    }
    let candidates = engine.collaborative_recommendations(user_id, limit)?;
    if candidates.is_empty() {
        println!("{} User {} has no collaborative history", "!".yellow(), user_id);
        return Ok(());
    }
    println!("{}", format!("Collaborative matches for {}:", user_id).bold().blue());
    print_candidates(engine.catalog()?, &candidates);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, query: &str) {
    let query_lower = query.to_lowercase();

    // (relevance rank, catalog position): exact name, name contains, tags contain
    let mut matches: Vec<(u8, usize)> = catalog
        .programs()
        .iter()
        .enumerate()
        .filter_map(|(position, program)| {
            let name = program.name.to_lowercase();
            if name == query_lower {
                Some((0, position))
            } else if name.contains(&query_lower) {
                Some((1, position))
            } else if program.tags_text.to_lowercase().contains(&query_lower) {
                Some((2, position))
            } else {
                None
            }
        })
        .collect();
    matches.sort();

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  No programs found");
        return;
    }
    for (_, position) in matches.iter().take(20) {
        if let Some(program) = catalog.get(*position) {
            println!(
                "{}: {} [{}]",
                program.id.cyan(),
                program.name,
                program.tags_text
            );
        }
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let interests = interest_pool(engine.catalog()?);
    if interests.is_empty() {
        bail!("Catalog has no tags to draw interests from");
    }
    let user_ids: Vec<String> = engine
        .store()
        .ensure_loaded()?
        .collaborative()
        .map(|model| model.user_ids().cloned().collect())
        .unwrap_or_default();

    // Random interests (two tags) and, half the time, a known user
    let workload: Vec<(String, Option<String>)> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| {
                let first = interests.choose(&mut rng).cloned().unwrap_or_default();
                let second = interests.choose(&mut rng).cloned().unwrap_or_default();
                let user = if rng.random_bool(0.5) {
                    user_ids.choose(&mut rng).cloned()
                } else {
                    None
                };
                (format!("{}, {}", first, second), user)
            })
            .collect()
    };

    println!(
        "Running {} requests ({} concurrent)...",
        requests,
        concurrent.max(1)
    );

    let engine = Arc::new(engine);
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for (interests, user_id) in workload {
        let engine = engine.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                engine.hybrid_recommendations(&interests, user_id.as_deref(), DEFAULT_K)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await?
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();
    info!("Benchmark finished {} requests in {:?}", requests, total_time);

    timings.sort();
    let average = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", average);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Distinct lowercase tags across the catalog
fn interest_pool(catalog: &Catalog) -> Vec<String> {
    let mut tags: Vec<String> = catalog
        .programs()
        .iter()
        .flat_map(|program| program.tags_text.split(','))
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[ProgramRecommendation], explain: bool) {
    print!("{}", "Program Recommendations:\n".bold().blue());
    if recommendations.is_empty() {
        println!("  No programs matched");
        return;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.name,
            rec.program_id,
            rec.tags,
            rec.score
        );
        if explain {
            println!("   {}", rec.explanation.italic());
        }
    }
}

fn print_candidates(catalog: &Catalog, candidates: &[ScoredCandidate]) {
    if candidates.is_empty() {
        println!("  No programs matched");
        return;
    }
    for (i, candidate) in candidates.iter().enumerate() {
        let name = catalog
            .get_by_id(&candidate.program_id)
            .map(|program| program.name.as_str())
            .unwrap_or("(not in catalog)");
        println!(
            "{}. {} ({}) - Score: {:.3}",
            (i + 1).to_string().green(),
            name,
            candidate.program_id,
            candidate.score
        );
        if let Some(explanation) = &candidate.explanation {
            println!("   {}", explanation);
        }
    }
}
