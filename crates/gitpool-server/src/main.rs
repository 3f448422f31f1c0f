use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use gitpool_db::Db;
use gitpool_repo::PgBackend;
use gitpool_server::{GitpoolServer, ServerConfig};

/// Multi-tenant git hosting over smart HTTP, backed by postgres.
#[derive(Parser)]
#[command(name = "gitpool-server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Postgres connection URL (overrides DB_URL and the config file).
    #[arg(long)]
    db_url: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Ok(url) = std::env::var("DB_URL") {
        config.db_url = url;
    }
    if let Some(url) = args.db_url {
        config.db_url = url;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let db = Arc::new(Db::connect(&config.db_config())?);
    let backend = Arc::new(PgBackend::new(db));
    backend.ensure_schema().await?;

    GitpoolServer::new(config, backend).serve().await?;
    Ok(())
}
