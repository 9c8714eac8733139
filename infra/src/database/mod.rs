//! Database module - Postgres implementations using SQLx
//!
//! Connection pool management and the read-only directory repository.

pub mod connection;
pub mod directory;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use directory::PgDirectoryRepository;

pub use ac_shared::config::DatabaseConfig;
