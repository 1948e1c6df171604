//! SQLite access layer
//!
//! One store type backs both the coordinator directory (read-only) and the
//! append-only assessment table.

use sqlx::SqlitePool;

mod assessments;
mod people;

/// SQLite-backed [`PersonDirectory`](crate::lookup::PersonDirectory) and
/// [`EvaluationStore`](crate::dispatch::EvaluationStore)
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // Single connection: every pooled connection would otherwise get its own
    // private in-memory database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    coordeval_common::db::create_tables(&pool)
        .await
        .expect("schema");
    pool
}
