use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use youtoxic::artifacts::AssembleOutcome;
use youtoxic::classify::{Category, Pipeline};
use youtoxic::config::Config;

/// youtoxic: classify short texts for toxicity, identity hate, obscenity
/// and insults.
#[derive(Parser)]
#[command(name = "youtoxic", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more texts
    Classify {
        /// Texts to classify
        #[arg(required = true)]
        texts: Vec<String>,

        /// Categories to run: toxic, identity, obscene, insult (default: all)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Score toxicity with the experimental ULM model instead
        #[arg(long, conflicts_with = "types")]
        ulm: bool,

        /// Keep mentions and links instead of stripping them
        #[arg(long)]
        raw: bool,
    },

    /// Join sharded artifacts (<file>.part1, .part2, ...) into their full files
    AssembleArtifacts,

    /// Show which artifacts are present
    Status,

    /// Start the JSON API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("youtoxic=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            texts,
            types,
            ulm,
            raw,
        } => {
            let config = Config::load()?;
            let pipeline = load_pipeline(&config)?;

            let inputs = if raw {
                texts.clone()
            } else {
                youtoxic::text::preprocess::preprocess_texts(&texts)
            };

            if ulm {
                let batch = pipeline.predict_toxicity_ulm_multiple(&inputs)?;
                youtoxic::output::terminal::display_ulm(&texts, &batch);
                return Ok(());
            }

            let categories = if types.is_empty() {
                Category::ALL.to_vec()
            } else {
                types
                    .iter()
                    .map(|t| t.parse())
                    .collect::<Result<Vec<Category>>>()?
            };

            let results = pipeline.classify(&categories, &inputs)?;
            youtoxic::output::terminal::display_classifications(&texts, &results);
        }

        Commands::AssembleArtifacts => {
            let config = Config::load()?;
            let dir = &config.artifact_dir;

            println!("Assembling sharded artifacts...");
            println!("  Directory: {}", dir.display());

            let assembled = youtoxic::artifacts::assemble_all(dir, true)?;
            if assembled.is_empty() {
                println!("  Nothing to assemble.");
            }
            for (file, outcome) in &assembled {
                if let AssembleOutcome::Assembled { shards, bytes } = outcome {
                    println!("  {} {file} ({shards} shards, {bytes} bytes)", "✓".green());
                }
            }

            let missing = youtoxic::artifacts::missing_artifacts(dir);
            if missing.is_empty() {
                println!("\n{}", "All artifacts present.".bold());
            } else {
                println!(
                    "\n{} Still missing (no shards found): {}",
                    "Warning:".yellow(),
                    missing.join(", ")
                );
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            youtoxic::status::show(&config.artifact_dir, config.threshold);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let pipeline = load_pipeline(&config)?;
            youtoxic::web::run_server(std::sync::Arc::new(pipeline), port, &bind).await?;
        }
    }

    Ok(())
}

/// Check the artifact directory, then load every model eagerly.
fn load_pipeline(config: &Config) -> Result<Pipeline> {
    config.require_artifacts()?;
    info!(dir = %config.artifact_dir.display(), "Loading models");
    let pipeline = Pipeline::load(&config.artifact_dir)?.with_threshold(config.threshold);
    Ok(pipeline)
}
