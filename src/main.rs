// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pdf_qa::utils::logging::{format_heading, format_info, format_success};
use pdf_qa::{AskOptions, Config, QaPipeline, RetrievalStrategy};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "pdf_qa")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Retrieval-augmented question answering over a PDF using LanceDB", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = pdf_qa::config::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk and index the configured PDF (skipped when the collection exists)
    Index,

    /// Answer a question from the document
    Ask {
        question: String,

        /// Number of chunks to retrieve for similarity search
        #[arg(short, long)]
        k: Option<usize>,

        /// Require a [Source, Page] citation on every bullet point
        #[arg(long)]
        strict: bool,

        /// Skip the reference-number lookup and always use similarity search
        #[arg(long)]
        no_reference: bool,
    },

    /// Show the chunks most similar to a query without calling the language model
    Search {
        query: String,

        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Show collection statistics
    Stats,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    colored::control::set_override(cli.color);
    pdf_qa::utils::logging::init_logger(cli.color, cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("PDF QA pipeline");
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Index => cmd_index(config, cli.color).await,
        Commands::Ask {
            question,
            k,
            strict,
            no_reference,
        } => {
            let options = AskOptions {
                k,
                strict_citations: strict.then_some(true),
                reference_lookup: no_reference.then_some(false),
            };
            cmd_ask(config, &question, options, cli.color).await
        }
        Commands::Search { query, k } => cmd_search(config, &query, k).await,
        Commands::Stats => cmd_stats(config).await,
    }
}

fn load_config(path: &Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());

    if path.exists() {
        return Config::load(Some(path)).context("Failed to load configuration");
    }

    warn!(
        "Config file {} not found, using defaults and environment",
        path.display()
    );
    Config::load(None).context("Failed to load configuration")
}

async fn cmd_index(config: Config, color: bool) -> Result<()> {
    let mut pipeline = QaPipeline::retrieval_only(config)
        .await
        .context("Failed to initialise pipeline")?
        .with_progress(true, color);

    let prepared = pipeline.prepare().await?;

    if prepared.index.reused {
        println!(
            "{}",
            format_info(&format!(
                "Collection '{}' already exists, nothing to index",
                prepared.index.collection
            ))
        );
    } else {
        println!(
            "{}",
            format_success(&format!(
                "Indexed {} chunks from {} pages into '{}' ({} batches)",
                prepared.index.chunks_written,
                prepared.pages,
                prepared.index.collection,
                prepared.index.batches_written
            ))
        );
    }

    Ok(())
}

async fn cmd_ask(config: Config, question: &str, options: AskOptions, color: bool) -> Result<()> {
    let mut pipeline = QaPipeline::from_config(config)
        .await
        .context("Failed to initialise pipeline")?
        .with_progress(true, color);

    pipeline.prepare().await?;
    let outcome = pipeline.ask(question, options).await?;

    match &outcome.retrieval.strategy {
        RetrievalStrategy::ExactReference { reference } => info!(
            "Answered from {} chunks containing '{}'",
            outcome.retrieval.len(),
            reference
        ),
        RetrievalStrategy::Similarity { k } => info!(
            "Answered from {} of top-{} similar chunks",
            outcome.retrieval.len(),
            k
        ),
    }

    println!("{}", outcome.answer);
    Ok(())
}

async fn cmd_search(config: Config, query: &str, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.pipeline.default_k);
    let pipeline = QaPipeline::retrieval_only(config)
        .await
        .context("Failed to initialise pipeline")?;

    let result = pipeline.search(query, k).await?;

    println!(
        "{}",
        format_heading(&format!("{} results for \"{}\"", result.len(), query))
    );
    for (rank, hit) in result.hits.iter().enumerate() {
        println!("{}. {}", rank + 1, hit.format_summary(200));
    }

    Ok(())
}

async fn cmd_stats(config: Config) -> Result<()> {
    let pipeline = QaPipeline::retrieval_only(config)
        .await
        .context("Failed to initialise pipeline")?;

    let stats = pipeline.stats().await?;

    println!("{}", format_heading("=== Collection Statistics ==="));
    println!("Collection: {}", stats.collection);
    println!("Backend: {}", stats.backend);
    println!("Exists: {}", stats.exists);
    println!("Vectors: {}", stats.vectors);

    Ok(())
}
