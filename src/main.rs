use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::{fmt, EnvFilter};

mod calculator;
mod config;
mod controllers;
mod db_ops;
mod dto;
mod errors;
mod export;
mod ledger;
mod middleware;
mod models;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = config::Config::from_env()?;
    let db = create_pg_pool(&config).await?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("running database migrations")?;

    let app = routes::app(models::AppState { db });

    tracing::info!("listening on {}", config.listen_addr);
    axum::Server::bind(&config.listen_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).init();
}

async fn create_pg_pool(config: &config::Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("pool to be able to connect")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c; shutting down");
        return;
    }
    tracing::info!("received ctrl-c, shutting down");
}
