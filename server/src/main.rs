use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use quill_server::{build_app, load_index, AppState};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Analyzer configuration file
    #[arg(long, default_value = "./quill.json")]
    config: String,
    /// Records to index at startup (JSON array or JSONL)
    #[arg(long)]
    seed: Option<String>,
    /// Fields to index from the seed, comma-separated; defaults to every configured field
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let index = load_index(&args.config, args.seed.as_deref(), &args.fields)?;
    let app = build_app(AppState::from_env(index));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
