use std::path::PathBuf;

use clap::Parser;

use troika_server::ServerConfig;
use troika_store::Database;

/// Three-tier task tracker server.
#[derive(Debug, Parser)]
#[command(name = "troika", version)]
struct Args {
    /// Path to the SQLite database. Defaults to ~/.troika/troika.db.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Port to listen on. 0 picks an ephemeral port.
    #[arg(long, default_value_t = ServerConfig::default().port)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db_path = args
        .db_path
        .unwrap_or_else(|| dirs_home().join(".troika").join("troika.db"));
    let db = Database::open(&db_path).expect("failed to open database");

    let config = ServerConfig { port: args.port };
    let handle = troika_server::start(config, db)
        .await
        .expect("failed to start server");

    tracing::info!(port = handle.port, "troika ready");

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");

    tracing::info!("shutting down");
    handle.shutdown();
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
