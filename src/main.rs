use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docq::embed::{Embedder, HttpEmbedderBuilder};
use docq::utils::{ensure_database_directory, get_database_path};
use docq::{CorpusStore, Database, DocumentIngestor, QueryConfig, QueryService};

/// docq - question answering over uploaded company documents
#[derive(Parser)]
#[command(name = "docq")]
#[command(about = "Ask natural-language questions over a small document corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ingest a file into the corpus
    Add(AddCommand),
    /// Ask a question over the corpus
    Ask(AskCommand),
    /// List stored documents
    List,
    /// Print the content of a stored document
    Show(ShowCommand),
    /// Show corpus and query statistics
    Stats,
}

/// Ingest a file into the corpus
#[derive(Parser)]
struct AddCommand {
    /// Path to the file to ingest (.txt, .md, .csv, .json)
    #[arg(value_name = "FILE")]
    file: String,
}

/// Ask a question over the corpus
#[derive(Parser)]
struct AskCommand {
    /// The question to answer
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Override the similarity threshold
    #[arg(long, value_name = "THRESHOLD")]
    threshold: Option<f32>,

    /// Override the number of candidates to keep
    #[arg(long, value_name = "K")]
    top_k: Option<usize>,
}

/// Print the content of a stored document
#[derive(Parser)]
struct ShowCommand {
    /// Filename of the document to print
    #[arg(value_name = "FILENAME")]
    filename: String,
}

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Add(cmd) => handle_add(cmd),
        Commands::Ask(cmd) => handle_ask(cmd),
        Commands::List => handle_list(),
        Commands::Show(cmd) => handle_show(cmd),
        Commands::Stats => handle_stats(),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures like an empty question or an
/// unsupported file type. Internal errors include database and service
/// failures.
fn is_user_error(error: &anyhow::Error) -> bool {
    let message = error.to_string();
    message.contains("cannot be empty")
        || message.contains("Unsupported file type")
        || message.contains("No such document")
}

fn open_store() -> Result<CorpusStore> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    CorpusStore::new(db)
}

/// Handles the add command by ingesting and embedding a file.
fn handle_add(cmd: &AddCommand) -> Result<()> {
    let path = Path::new(&cmd.file);
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("File path has no usable filename"))?;

    let embedder = HttpEmbedderBuilder::new().build()?;
    let store = open_store()?;

    execute_add(&bytes, filename, &embedder, &store)
}

/// Executes the add command logic with provided collaborators.
///
/// This function is separated from `handle_add` to allow testing with
/// in-memory databases and mock embedders.
fn execute_add(
    bytes: &[u8],
    filename: &str,
    embedder: &dyn Embedder,
    store: &CorpusStore,
) -> Result<()> {
    let ingestor = DocumentIngestor::new();
    let (content, file_type) = ingestor.ingest(bytes, filename)?;

    let embedding = embedder
        .embed(&content)
        .context("Embedding service unavailable")?;

    let document = store.add_document(filename, &content, file_type, &embedding)?;

    println!(
        "Document stored (id: {}, type: {}, {} chars)",
        document.id,
        document.file_type,
        document.content.chars().count()
    );

    Ok(())
}

/// Handles the ask command: embed the question, then run the engine.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let embedder = HttpEmbedderBuilder::new().build()?;
    let query_vector = embedder
        .embed(&cmd.question)
        .context("Embedding service unavailable")?;

    let mut config = QueryConfig::from_env();
    if let Some(threshold) = cmd.threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(top_k) = cmd.top_k {
        config.top_k = top_k;
    }

    let service = QueryService::with_config(open_store()?, config);
    let response = service.answer(&cmd.question, &query_vector)?;

    println!("{}", response.answer.answer());
    if let Some(source) = response.answer.source() {
        println!("Source: {source}");
    }
    println!(
        "Confidence: {:.2} ({}) in {}ms",
        response.answer.confidence(),
        response.answer.extractor(),
        response.latency_ms
    );

    if !response.candidates.is_empty() {
        println!("\nRanked candidates:");
        for candidate in &response.candidates {
            println!("  {:.4}  {}", candidate.similarity, candidate.filename);
        }
    }

    Ok(())
}

/// Handles the list command.
fn handle_list() -> Result<()> {
    let store = open_store()?;
    let snapshot = store.snapshot();

    if snapshot.is_empty() {
        println!("No documents stored.");
        return Ok(());
    }

    for document in snapshot.iter() {
        println!(
            "{:>4}  {:<10}  {:>7} chars  {}",
            document.id,
            document.file_type.to_string(),
            document.content.chars().count(),
            document.filename
        );
    }

    Ok(())
}

/// Handles the show command.
fn handle_show(cmd: &ShowCommand) -> Result<()> {
    let store = open_store()?;

    let document = store
        .document_by_filename(&cmd.filename)
        .ok_or_else(|| anyhow::anyhow!("No such document: {}", cmd.filename))?;

    println!("{}", document.content);
    Ok(())
}

/// Handles the stats command.
fn handle_stats() -> Result<()> {
    let store = open_store()?;

    println!("Documents stored:  {}", store.len());
    println!("Queries processed: {}", store.query_count()?);

    let recent = store.recent_queries(5)?;
    if !recent.is_empty() {
        println!("\nRecent queries:");
        for entry in recent {
            println!(
                "  [{} results, {}ms] {}",
                entry.result_count, entry.latency_ms, entry.question
            );
        }
    }

    Ok(())
}
