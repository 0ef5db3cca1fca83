//! lectern-db: SQLite persistence for users, catalog, orders, and progress.
//!
//! Provides the connection pool, embedded migrations, row-mapped models,
//! and one query module per table group.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
