use anyhow::Result;
use axum::Router;
use clap::Parser;
use search_core::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Index file path (defaults to INDEX_PATH)
    #[arg(long)]
    index: Option<PathBuf>,
    /// Directory of `{doc_id}.html` files (defaults to HTMLS_DIR)
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Stopword list (defaults to STOPWORDS_PATH)
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = EngineConfig::from_env()?;
    if let Some(p) = args.index { config.index_path = p; }
    if let Some(p) = args.corpus { config.corpus_dir = p; }
    if let Some(p) = args.stopwords { config.stopwords_path = p; }
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
