use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::time::Duration;
use tracing::info;

/// Statements which bring an empty database up to the schema the persistence layer expects.
/// Every statement is safe to run against a database that already has the schema.
const SCHEMA_STATEMENTS: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        description TEXT NULL,
        done BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS ix_todo_title ON todos (title)",
    "CREATE INDEX IF NOT EXISTS ix_todos_user_id ON todos (user_id)",
];

/// Builds a connection pool for the database at [url]
pub async fn connect_sqlx(url: &str, max_connections: u32) -> Result<PgPool, anyhow::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect(url)
        .await
        .context("connecting to the database")
}

/// Creates the tables and indices the service needs if they are missing
pub async fn ensure_schema(pool: &PgPool) -> Result<(), anyhow::Error> {
    let mut txn = pool.begin().await.context("starting schema transaction")?;

    for statement in SCHEMA_STATEMENTS {
        (&mut *txn)
            .execute(statement)
            .await
            .with_context(|| format!("running schema statement: {statement}"))?;
    }

    txn.commit().await.context("committing schema changes")?;
    info!("Database schema is in place");

    Ok(())
}
