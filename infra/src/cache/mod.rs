//! Cache module for Redis-backed session storage
//!
//! This module provides the Redis client with retry logic and per-command
//! deadlines, and the `TokenStore` implementation refresh records live in.

pub mod redis_client;
pub mod token_store;


pub use redis_client::RedisClient;
pub use token_store::RedisTokenStore;

// Re-export commonly used types
pub use ac_shared::config::CacheConfig;
