//! Storage dei messaggi: il relay conosce solo il trait [`MessageStore`],
//! l'implementazione concreta del processo è [`SqliteStore`].

use anyhow::Context;
use async_trait::async_trait;
use axum::http::StatusCode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use staffetta_core::Message;
use std::path::{Path, PathBuf};

/// Client dello storage: un'unica operazione di insert di un documento.
/// Deve essere usabile da più connessioni del relay in parallelo.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &Message) -> anyhow::Result<()>;

    /// Usato da GET /health.
    async fn healthy(&self) -> bool {
        true
    }
}

/// Store SQLite: una riga `(id, username, message, date)` per messaggio nella tabella configurata.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
    insert_sql: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, table: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(is_valid_table_name(table), "invalid table name {:?}", table);
        Ok(Self {
            pool,
            table: table.to_string(),
            insert_sql: format!("INSERT INTO {table} (username, message, date) VALUES (?, ?, ?)"),
        })
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query(&self.insert_sql)
            .bind(&message.author)
            .bind(&message.body)
            .bind(&message.received_at)
            .execute(&self.pool)
            .await
            .with_context(|| format!("insert into {}", self.table))?;
        Ok(())
    }

    async fn healthy(&self) -> bool {
        health_with_pool(&self.pool).await.is_success()
    }
}

/// Il nome tabella finisce dentro l'SQL, quindi solo `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Dato un percorso di file, restituisce un URL SQLite valido. Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&abs)
        .with_context(|| format!("create/open sqlite file {:?}", abs))?;
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite:///{}", s.trim_start_matches('/')))
}

/// Costruisce l'URL SQLite dalla stringa di connessione configurata (DATABASE_URL).
/// Se non è impostata usa "<database_name>.db" nella directory corrente.
pub fn build_sqlite_url(database_url: Option<&str>, database_name: &str) -> anyhow::Result<String> {
    let raw = match database_url {
        Some(url) => url.to_string(),
        None => format!("{database_name}.db"),
    };
    if is_memory_url(&raw) {
        return Ok(raw);
    }
    // Rimuovi il prefisso "sqlite://" se presente, per ottenere il percorso del file.
    // "sqlite:///abs/path" lascia "/abs/path", "sqlite://rel.db" lascia "rel.db".
    let path_part = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(&raw);
    let path = PathBuf::from(path_part);
    sqlite_url_for_path(&path)
}

fn is_memory_url(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || url.contains("mode=memory")
}

// Connect to the database and return a connection pool.
pub async fn connect_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
    let mut options = SqlitePoolOptions::new();
    if is_memory_url(db_url) {
        // ogni connessione a ":memory:" è un database diverso: una sola, mai chiusa
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = options
        .connect(db_url)
        .await
        .with_context(|| format!("connect to sqlite via {}", db_url))?;
    Ok(pool)
}

// Esegue le migrazioni del database. Crea la tabella dei messaggi se non esiste.
pub async fn run_migrations(pool: &SqlitePool, table: &str) -> anyhow::Result<()> {
    anyhow::ensure!(is_valid_table_name(table), "invalid table name {:?}", table);

    let stmts = [
        format!(
            r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            message  TEXT NOT NULL,
            date     TEXT NOT NULL
        );"#
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table} (date);"),
    ];
    // applica ogni statement di migrazione
    for s in &stmts {
        sqlx::query(s)
            .execute(pool)
            .await
            .with_context(|| format!("apply migration: {}", &s[..s.len().min(40)].replace('\n', " ")))?;
    }
    Ok(())
}

/// Controlla lo stato di salute del database tentando di acquisire una connessione dal pool.
pub async fn health_with_pool(pool: &SqlitePool) -> StatusCode {
    match pool.acquire().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
