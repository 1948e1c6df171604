//! Database initialization
//!
//! Creates the SQLite file and both tables on first run. Table creation is
//! idempotent and runs on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every connection, in milliseconds
pub const BUSY_TIMEOUT_MS: i64 = 5000;

/// Open (creating if needed) the evaluation database
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets lookups proceed while a submission is being written
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create every table used by the service
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_coordinators_table(pool).await?;
    create_competency_assessments_table(pool).await?;
    Ok(())
}

/// Coordinators available for evaluation
///
/// Populated externally; the service only reads it.
async fn create_coordinators_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS coordinators (
            registration TEXT NOT NULL,
            name TEXT NOT NULL,
            regional TEXT,
            admission TEXT,
            national_id TEXT,
            job_title TEXT,
            location TEXT,
            school TEXT,
            monthly_hours TEXT,
            weekly_hours TEXT,
            tenure_months TEXT,
            cumulative_hours TEXT,
            unexcused_absence_hours TEXT,
            unexcused_absence_pct TEXT,
            UNIQUE (school, registration)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_coordinators_school ON coordinators(school)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per competency per submission, append-only
///
/// `unit`, `regional`, `registration`, `name` and `school` hold the evaluated
/// person's snapshot and stay NULL unless context persistence is enabled.
async fn create_competency_assessments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competency_assessments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            competency TEXT NOT NULL,
            prompt TEXT,
            level_1 TEXT,
            level_2 TEXT,
            level_3 TEXT,
            level_4 TEXT,
            rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 4),
            development_actions TEXT,
            unit TEXT,
            regional TEXT,
            registration TEXT,
            name TEXT,
            school TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
