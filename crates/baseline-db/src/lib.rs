//! Persistence layer for baseline: sqlx models, connection pool, embedded
//! migrations, per-table query functions, and the [`store::ItemStore`]
//! abstraction the engine runs against.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;
