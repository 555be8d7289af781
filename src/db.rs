use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Builds the application's database connection pool from a PostgreSQL connection string.
pub async fn connect_sqlx(db_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(db_url)
        .await
        .expect("Failed to build connection pool")
}

/// Applies the migrations embedded from the `migrations/` directory, bringing the
/// connected database up to the schema this application expects.
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!()
        .run(pool)
        .await
        .context("Applying database migrations")?;

    Ok(())
}
