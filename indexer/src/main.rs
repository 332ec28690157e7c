use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use search_core::{EngineConfig, SearchEngine};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a BM25 index over a directory of HTML documents", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for HTMLS_DIR, STOPWORDS_PATH and INDEX_PATH.
#[derive(Args)]
struct PathArgs {
    /// Directory of `{doc_id}.html` files
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,
    /// Stopword list, one word per line
    #[arg(long, global = true)]
    stopwords: Option<PathBuf>,
    /// Index file to write or read
    #[arg(long, global = true)]
    index: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index over a range of document ids and save it
    Build {
        /// First document id (inclusive)
        #[arg(long)]
        start: Option<u32>,
        /// Last document id (inclusive)
        #[arg(long)]
        end: Option<u32>,
        /// Weight of each title occurrence
        #[arg(long)]
        title_weight: Option<u32>,
        /// Weight of each body occurrence
        #[arg(long)]
        body_weight: Option<u32>,
    },
    /// Query the index; reads queries from stdin when --query is absent
    Search {
        #[arg(long, short)]
        query: Option<String>,
        /// Number of results to show
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()?;
    if let Some(p) = cli.paths.corpus { config.corpus_dir = p; }
    if let Some(p) = cli.paths.stopwords { config.stopwords_path = p; }
    if let Some(p) = cli.paths.index { config.index_path = p; }

    match cli.command {
        Commands::Build { start, end, title_weight, body_weight } => {
            if let Some(v) = start { config.first_doc = v; }
            if let Some(v) = end { config.last_doc = v; }
            if let Some(v) = title_weight { config.weights.title = v; }
            if let Some(v) = body_weight { config.weights.body = v; }
            build(SearchEngine::new(config))
        }
        Commands::Search { query, top_k } => {
            if let Some(k) = top_k { config.top_k = k; }
            search(SearchEngine::new(config), query)
        }
    }
}

fn build(engine: SearchEngine) -> Result<()> {
    let snapshot = engine.build_and_save()?;
    println!(
        "index saved to {} with {} documents",
        engine.config().index_path.display(),
        snapshot.total_docs
    );
    Ok(())
}

fn search(engine: SearchEngine, query: Option<String>) -> Result<()> {
    if !engine.config().index_path.exists() {
        tracing::info!(path = %engine.config().index_path.display(), "no index found, building one");
        engine.build_and_save()?;
    }
    if let Some(q) = query {
        return print_results(&engine, &q);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nquery (q to quit): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        if let Err(err) = print_results(&engine, &line) {
            eprintln!("search failed: {err}");
        }
    }
    Ok(())
}

fn print_results(engine: &SearchEngine, query: &str) -> Result<()> {
    let hits = engine.search(query, None)?;
    if hits.is_empty() {
        println!("no matching documents");
        return Ok(());
    }
    println!("top {} results:", hits.len());
    for (rank, hit) in hits.iter().enumerate() {
        println!("{}. doc {} score {:.4}  {}", rank + 1, hit.doc_id, hit.score, engine.title_of(hit.doc_id));
    }
    Ok(())
}
