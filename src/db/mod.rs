//! Database connection pool and migration module.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8,
//! and the embedded schema migrations.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, applied_migrations, pending_migrations, revert_migrations, run_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool};

#[cfg(test)]
pub(crate) use pool::lazy_pool;
