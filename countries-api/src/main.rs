use anyhow::{Context, Result};
use clap::Parser;
use countries_api::{database, Config};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("countries_api=info".parse()?),
        )
        .init();

    let config = Config::parse();

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid database URL '{}'", config.database_url))?;
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
    }

    let pool = SqlitePool::connect_with(options)
        .await
        .context("Failed to connect to SQLite database")?;

    database::setup(&pool).await.context("Failed to setup database")?;
    if config.seed {
        database::seed(&pool).await.context("Failed to seed database")?;
    }

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;

    tracing::info!("Countries API running at http://{}/api/countries", bind_address);

    axum::serve(listener, countries_api::router(pool.clone()))
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", error);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    pool.close().await;
    Ok(())
}
