use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

// ri-utilizziamo le funzioni e strutture definite in lib.rs
use staffetta_server::{build_sqlite_url, connect_pool, run_migrations, App, Config, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("staffetta_server=info,staffetta_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("load configuration")?;

    // Costruisci l'URL del database SQLite
    let db_url = build_sqlite_url(config.database_url.as_deref(), &config.database_name)
        .context("build sqlite DATABASE_URL")?;
    tracing::info!("Using DATABASE_URL = {}", db_url);
    let pool = connect_pool(&db_url).await.context("connect to sqlite")?;
    run_migrations(&pool, &config.messages_table).await.context("run migrations")?;
    let store = Arc::new(SqliteStore::new(pool, &config.messages_table)?);

    // relay listener + server HTTP; un bind fallito interrompe l'avvio
    let app = App::bind(&config, store).await?;
    app.run().await
}
