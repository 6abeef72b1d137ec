//! # Branch Repository

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Takes the write lock and checks the branch exists.
///
/// Must be the first statement of every lifecycle transaction: the no-op
/// UPDATE upgrades the deferred SQLite transaction to a write transaction
/// before anything is read.
pub(crate) async fn lock_branch(conn: &mut SqliteConnection, branch_id: i64) -> DbResult<()> {
    let result = sqlx::query("UPDATE branches SET id = id WHERE id = ?")
        .bind(branch_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Branch", branch_id));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: SqlitePool,
}

impl BranchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BranchRepository { pool }
    }

    /// Creates a branch and returns its id.
    pub async fn create(&self, name: &str) -> DbResult<i64> {
        debug!(name, "Creating branch");

        let result = sqlx::query("INSERT INTO branches (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM branches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}
