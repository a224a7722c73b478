//! CLI interface for the recommender's management commands

use crate::config::OutputFormat;
use crate::error::EntityKind;
use crate::recommendation::Strategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "emprega-recommender")]
#[command(about = "Candidate and job posting recommendations for the emprega job board")]
#[command(long_about = "Compute text features for candidates and postings, then rank one kind against the other by lexical (TF-IDF) or semantic (embedding) similarity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file holding candidates, postings and employers
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute and save the features of one candidate or posting
    Process {
        /// Entity kind: candidate or posting
        #[arg(value_parser = parse_entity_kind)]
        kind: EntityKind,

        /// Primary key
        id: u64,
    },

    /// Queue feature jobs for every stored candidate or posting
    Backfill {
        /// Entity kind: candidate or posting
        #[arg(value_parser = parse_entity_kind)]
        kind: EntityKind,

        /// Seconds to wait between enqueued items
        #[arg(long)]
        delay: Option<f64>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Rank postings for a candidate, or candidates for a posting
    Recommend {
        /// Pivot kind: candidate (ranks postings) or posting (ranks candidates)
        #[arg(value_parser = parse_entity_kind)]
        kind: EntityKind,

        /// Pivot primary key
        id: u64,

        /// Strategy: lexical or semantic
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Show at most this many results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// Download a model into the local cache
    Download {
        /// Model name or HuggingFace repo ID (defaults to the configured model)
        model: Option<String>,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model name (defaults to the configured model)
        model: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Parse an entity kind, accepting the Portuguese names as well
pub fn parse_entity_kind(kind: &str) -> Result<EntityKind, String> {
    match kind.to_lowercase().as_str() {
        "candidate" | "candidato" => Ok(EntityKind::Candidate),
        "posting" | "vaga" => Ok(EntityKind::Posting),
        _ => Err(format!("Invalid entity kind: {}. Supported: candidate, posting", kind)),
    }
}
