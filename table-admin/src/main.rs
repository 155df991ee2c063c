//! table-admin server
//!
//! Serves the admin API for a MySQL server or a directory of SQLite databases.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use table_admin::{AdminLayer, StoreAccessor};

#[derive(Parser, Debug)]
#[command(name = "table-admin")]
#[command(version, about = "HTTP admin API for relational databases")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "TABLE_ADMIN_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Path the API is mounted under
    #[arg(long, env = "TABLE_ADMIN_BASE_PATH", default_value = "/admin")]
    base_path: String,

    /// Database backend to administer
    #[command(subcommand)]
    backend: Backend,
}

#[derive(Subcommand, Debug)]
enum Backend {
    /// Connect to a MySQL server
    Mysql {
        /// Server host, optionally followed by :port
        #[arg(long, env = "TABLE_ADMIN_HOST", default_value = "localhost")]
        host: String,

        /// User name
        #[arg(long, env = "TABLE_ADMIN_USER", default_value = "root")]
        user: String,

        /// Password
        #[arg(long, env = "TABLE_ADMIN_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
    },

    /// Use a directory of SQLite database files
    Sqlite {
        /// Directory holding one .db file per database
        #[arg(long, env = "TABLE_ADMIN_DIRECTORY", default_value = "./data")]
        directory: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("table_admin=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.backend {
        Backend::Mysql {
            host,
            user,
            password,
        } => {
            let layer = AdminLayer::mysql(&cli.base_path, &host, &user, &password).await?;
            serve(layer, &cli.bind, &cli.base_path).await
        }
        Backend::Sqlite { directory } => {
            let layer = AdminLayer::sqlite(&cli.base_path, directory).await?;
            serve(layer, &cli.bind, &cli.base_path).await
        }
    }
}

/// Serve the admin API until Ctrl-C, then close the accessor's connections
async fn serve<DB: StoreAccessor>(layer: AdminLayer<DB>, bind: &str, base_path: &str) -> Result<()> {
    let accessor = layer.accessor();
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!(
        "Admin API available at http://{}{}/api",
        bind,
        base_path.trim_end_matches('/')
    );

    axum::serve(listener, layer.into_router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    accessor.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", error);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
