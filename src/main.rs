use anyhow::Result;
use clap::Parser;
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// Import from our modular crates
use raq_cli::{display_banner, print_help, print_response, read_input};
use raq_core::{SearchProvider, TokenCounter, WhitespaceTokenCounter};
use raq_gemini::GeminiClient;
use raq_retrieval::{
    ChunkIndexer, ChunkerConfig, FusionRetriever, InMemorySearchProvider, RetrievalConfig,
    WindowChunker,
};
use raq_router::{ClassificationEngine, InMemorySessionStore, QueryRouter};

#[derive(Parser)]
#[command(name = "raq")]
#[command(about = "Strategy-routing RAG assistant", long_about = None)]
struct Cli {
    /// Directory of plain-text (.txt) documents to index at startup
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Ask a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Print the full routing result as JSON (with --query)
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RAQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    // Initialize components
    let gemini = Arc::new(GeminiClient::from_env()?);
    let store = Arc::new(InMemorySearchProvider::new());

    let chunker = WindowChunker::new(WhitespaceTokenCounter, ChunkerConfig::default())?;
    let indexer = ChunkIndexer::new(chunker, store.clone());
    if let Some(dir) = &cli.docs {
        seed_corpus(&indexer, dir).await?;
    }

    let retriever = FusionRetriever::new(store, gemini.clone(), RetrievalConfig::default())?;
    let engine = ClassificationEngine::new(gemini.clone());
    let sessions = Arc::new(InMemorySessionStore::new());
    let router = QueryRouter::new(engine, retriever, gemini, sessions);

    let session_id = Uuid::new_v4().to_string();

    // Handle one-shot query execution
    if let Some(query) = cli.query {
        let response = router.route(&session_id, &query).await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_response(&response, true);
        }
        return Ok(());
    }

    // Interactive mode
    display_banner();

    let mut history = Vec::new();

    loop {
        let input = read_input(&mut history)?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        println!("{} Routing...", "→".blue());
        let response = router.route(&session_id, &input).await;
        print_response(&response, true);
    }

    Ok(())
}

/// Index every .txt file in `dir` (non-recursive, sorted by name)
async fn seed_corpus<C, S>(indexer: &ChunkIndexer<C, S>, dir: &Path) -> Result<()>
where
    C: TokenCounter,
    S: SearchProvider,
{
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("txt"))
        .collect();
    files.sort();

    if files.is_empty() {
        println!(
            "{} no .txt files found under {}",
            "warning:".yellow(),
            dir.display()
        );
        return Ok(());
    }

    let mut total_chunks = 0;
    for path in &files {
        let text = fs::read_to_string(path)?;
        let source = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();
        let summary = indexer.index_text(&source, &text).await?;
        total_chunks += summary.chunks_indexed;
        println!(
            "  indexed {} ({} chunks, {} tokens)",
            source.bold(),
            summary.chunks_indexed,
            summary.tokens_indexed
        );
    }
    println!(
        "{} {} files, {} chunks",
        "corpus ready:".green(),
        files.len(),
        total_chunks
    );
    Ok(())
}
