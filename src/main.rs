//! emprega-recommender: feature backfill and recommendations from the command line

use clap::Parser;
use emprega_recommender::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use emprega_recommender::config::Config;
use emprega_recommender::error::{EntityKind, RecommenderError, Result};
use emprega_recommender::output::{formatter_for, RecommendationReport};
use emprega_recommender::pipeline::{backfill, FeaturePipeline, JobOutcome, LocalQueue, RetryPolicy};
use emprega_recommender::processing::embedding_manager::ModelLoader;
use emprega_recommender::processing::embeddings::{SharedEmbedder, TextEmbedder};
use emprega_recommender::recommendation::Recommender;
use emprega_recommender::store::{MemoryStore, ProfileStore};
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let data_path = cli
        .data
        .clone()
        .unwrap_or_else(|| config.storage.snapshot_path.clone());

    // Execute command
    if let Err(e) = run_command(cli.command, config, &config_path, &data_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    config: Config,
    config_path: &Path,
    data_path: &Path,
) -> Result<()> {
    match command {
        Commands::Process { kind, id } => {
            let store = Arc::new(MemoryStore::load(data_path).await?);
            let pipeline = FeaturePipeline::new(Arc::clone(&store), shared_embedder(&config));

            let result = match kind {
                EntityKind::Candidate => pipeline.process_candidate(id).await,
                EntityKind::Posting => pipeline.process_posting(id).await,
                EntityKind::Employer => Err(RecommenderError::InvalidInput(
                    "employers have no features to process".to_string(),
                )),
            };

            // The lexical text may be saved even when the embedding failed.
            store.save(data_path).await?;

            match result? {
                JobOutcome::Completed => println!("✅ Features saved for {} {}", kind, id),
                JobOutcome::Skipped => println!("⚠️  {} {} not found, nothing to do", kind, id),
            }
        }

        Commands::Backfill {
            kind,
            delay,
            no_progress,
        } => {
            let store = Arc::new(MemoryStore::load(data_path).await?);
            let pipeline = Arc::new(FeaturePipeline::new(
                Arc::clone(&store),
                shared_embedder(&config),
            ));
            let queue = LocalQueue::start(pipeline, RetryPolicy::from_config(&config));

            let delay = match delay {
                Some(secs) if secs.is_finite() && secs >= 0.0 => Duration::from_secs_f64(secs),
                Some(secs) => {
                    return Err(RecommenderError::InvalidInput(format!(
                        "delay must be a non-negative number of seconds, got {}",
                        secs
                    )))
                }
                None => config.backfill_delay(),
            };

            let queued = backfill(kind, store.as_ref(), &queue, delay, !no_progress).await?;
            info!("Waiting for {} queued job(s) to finish", queue.pending());
            queue.drain().await;
            store.save(data_path).await?;

            let stats = queue.stats();
            println!("📊 Backfill of {} {} record(s) finished", queued, kind);
            println!("  • Completed tasks: {}", stats.completed);
            println!("  • Skipped (deleted): {}", stats.skipped);
            println!("  • Retries: {}", stats.retried);
            println!("  • Failed: {}", stats.failed);
        }

        Commands::Recommend {
            kind,
            id,
            strategy,
            output,
            limit,
        } => {
            let store = MemoryStore::load(data_path).await?;
            let strategy = strategy.unwrap_or(config.recommendation.strategy);
            let recommender = Recommender::new();

            let mut output_config = config.output.clone();
            if let Some(format) = output {
                output_config.format =
                    cli::parse_output_format(&format).map_err(RecommenderError::InvalidInput)?;
            }

            let mut report = match kind {
                EntityKind::Candidate => {
                    let pivot = store.candidate(id).await?;
                    let result = recommender.recommend_scored(strategy, &pivot, store.postings().await);
                    RecommendationReport::new(&pivot, strategy, &result)
                }
                EntityKind::Posting => {
                    let pivot = store.posting(id).await?;
                    let result =
                        recommender.recommend_scored(strategy, &pivot, store.candidates().await);
                    RecommendationReport::new(&pivot, strategy, &result)
                }
                EntityKind::Employer => {
                    return Err(RecommenderError::InvalidInput(
                        "recommendations pivot on a candidate or a posting".to_string(),
                    ))
                }
            };

            if let Some(limit) = limit {
                report.entries.truncate(limit);
            }

            let formatter = formatter_for(&output_config);
            println!("{}", formatter.format_report(&report)?);
        }

        Commands::Models { action } => {
            let loader = ModelLoader::from_config(&config);

            match action {
                ModelAction::Download { model, force } => {
                    let model = model.unwrap_or_else(|| config.models.embedding_model.clone());

                    if force && loader.is_cached(&model) {
                        info!("Removing cached copy of {}", model);
                        tokio::fs::remove_dir_all(loader.model_dir(&model)).await?;
                    }

                    println!("📥 Downloading model: {}", model);
                    let dir = loader.ensure_cached(&model).await?;
                    println!("✅ Model available at {}", dir.display());
                }
                ModelAction::Info { model } => {
                    let model = model.unwrap_or_else(|| config.models.embedding_model.clone());

                    println!("🧠 Model: {}", model);
                    println!("  • Cache directory: {}", loader.model_dir(&model).display());

                    if loader.is_cached(&model) || Path::new(&model).is_dir() {
                        let embedder = loader.load(&model).await?;
                        println!("  • Status: cached");
                        println!("  • Dimensions: {}", embedder.dimension());
                    } else {
                        println!("  • Status: not downloaded");
                        println!("  Run `emprega-recommender models download {}` first", model);
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset at {}", config_path.display());
            }
            Some(ConfigAction::Show) | None => {
                println!("📁 {}", config_path.display());
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    RecommenderError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
            }
        },
    }

    Ok(())
}

/// Lazily loaded model handle shared by every job of this process.
fn shared_embedder(config: &Config) -> Arc<SharedEmbedder> {
    Arc::new(SharedEmbedder::new(
        ModelLoader::from_config(config),
        config.models.embedding_model.clone(),
    ))
}
