//! MedLens CLI
//!
//! Symptom signal extraction, trend clustering and claim review from the terminal.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use medlens_core::MIN_CLUSTERS;
use medlens_nlp::{CohereConfig, NerConfig, OpenAIBackendConfig, DEFAULT_NER_MODEL};
use medlens_runtime::{Engine, Settings};

#[derive(Parser)]
#[command(name = "medlens")]
#[command(author, version, about = "MedLens: symptom signals and health-claim review", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3); RUST_LOG overrides it
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// NER model identifier
    #[arg(long, env = "MEDLENS_NER_MODEL", default_value = DEFAULT_NER_MODEL, global = true)]
    ner_model: String,

    /// Hugging Face API token (or set HF_API_TOKEN env var)
    #[arg(long, env = "HF_API_TOKEN", global = true)]
    hf_token: Option<String>,

    /// Skip the NER model entirely
    #[arg(long, global = true)]
    no_ner: bool,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", global = true)]
    openai_key: Option<String>,

    /// OpenAI model
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini", global = true)]
    openai_model: String,

    /// Cohere API key (or set COHERE_API_KEY env var)
    #[arg(long, env = "COHERE_API_KEY", global = true)]
    cohere_key: Option<String>,

    /// Cohere model
    #[arg(long, env = "COHERE_MODEL", default_value = "command-r-plus", global = true)]
    cohere_model: String,

    /// Disable the result cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Upper bound on each cache store call, in milliseconds
    #[arg(long, default_value = "250", global = true)]
    cache_timeout_ms: u64,

    /// Load the NER model before handling the command
    #[arg(long, global = true)]
    warm_up: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract symptom signals with suggested actions
    Extract {
        /// Free-text symptom description
        #[arg(short, long)]
        text: String,

        /// Use the keyword heuristic only
        #[arg(long)]
        no_model: bool,
    },

    /// Cluster historical symptom descriptions (one per line)
    Patterns {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of clusters
        #[arg(short = 'k', long, default_value = "3")]
        clusters: usize,
    },

    /// Scan text for dubious health claims
    Scan {
        /// Article or post text
        #[arg(short, long)]
        text: String,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let ner = (!self.no_ner).then(|| NerConfig::new(&self.ner_model, self.hf_token.clone()));

        Settings {
            ner,
            openai: self
                .openai_key
                .as_deref()
                .map(|key| OpenAIBackendConfig::openai(key, &self.openai_model)),
            cohere: self
                .cohere_key
                .as_deref()
                .map(|key| CohereConfig::new(key, &self.cohere_model)),
            cache_enabled: !self.no_cache,
            cache_timeout: Duration::from_millis(self.cache_timeout_ms),
            eager_model: self.warm_up && !self.no_ner,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let engine = cli.settings().build().await;

    match cli.command {
        Commands::Extract { text, no_model } => {
            let report = engine.symptom_check(&text, !no_model).await;
            print_json(&report)?;
        }
        Commands::Patterns { input, clusters } => {
            run_patterns(&engine, &input, clusters).await?;
        }
        Commands::Scan { text } => {
            let report = engine.misinformation_scan(&text).await;
            print_json(&report)?;
        }
    }

    Ok(())
}

async fn run_patterns(engine: &Engine, input: &Path, k: usize) -> Result<()> {
    if k < MIN_CLUSTERS {
        anyhow::bail!("--clusters must be at least {}", MIN_CLUSTERS);
    }

    let contents = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let texts: Vec<&str> = contents.lines().collect();
    info!("Clustering {} samples from {}", texts.len(), input.display());

    let clusters = engine.cluster(&texts, k).await?;
    print_json(&clusters)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
