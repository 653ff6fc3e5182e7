//! Embedded schema migrations.
//!
//! The migration harness is synchronous, so every helper here opens a plain
//! `PgConnection` and must be called from `spawn_blocking`.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

/// Migrations compiled into the binary from the `migrations/` directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn connect(database_url: &str, purpose: &str) -> AppResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|e| AppError::Database {
        operation: format!("establish connection for {}", purpose),
        source: anyhow::anyhow!("Connection error: {}", e),
    })
}

fn migration_error(operation: &str, error: impl std::fmt::Display) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("Migration error: {}", error),
    }
}

/// Applies all pending migrations and returns their versions.
pub fn run_migrations(database_url: &str) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "migrations")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| migration_error("run pending migrations", e))?;

    Ok(applied.iter().map(|version| version.to_string()).collect())
}

/// Lists the names of migrations that have not been applied yet.
pub fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "migration check")?;

    let pending = conn
        .pending_migrations(MIGRATIONS)
        .map_err(|e| migration_error("check pending migrations", e))?;

    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}

/// Lists the versions of migrations already applied to the database.
pub fn applied_migrations(database_url: &str) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "migration check")?;

    let applied = conn
        .applied_migrations()
        .map_err(|e| migration_error("get applied migrations", e))?;

    Ok(applied.iter().map(|version| version.to_string()).collect())
}

/// Reverts the last `steps` migrations, newest first.
pub fn revert_migrations(database_url: &str, steps: u32) -> AppResult<Vec<String>> {
    if steps == 0 {
        return Err(AppError::validation(
            "rollback_steps",
            "Number of rollback steps must be greater than 0",
        ));
    }

    let mut conn = connect(database_url, "rollback")?;

    let applied = conn
        .applied_migrations()
        .map_err(|e| migration_error("get applied migrations", e))?;
    if applied.len() < steps as usize {
        return Err(AppError::validation(
            "rollback_steps",
            format!(
                "Cannot rollback {} migrations - only {} applied migrations available",
                steps,
                applied.len()
            ),
        ));
    }

    let mut reverted = Vec::with_capacity(steps as usize);
    for _ in 0..steps {
        let version = conn
            .revert_last_migration(MIGRATIONS)
            .map_err(|e| migration_error("revert migration", e))?;
        reverted.push(version.to_string());
    }

    Ok(reverted)
}
