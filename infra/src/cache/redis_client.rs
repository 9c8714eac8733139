//! Redis cache client implementation
//!
//! Provides a Redis client with connection retry, per-command deadlines and
//! the operations the token store needs: set with expiry, get, delete, the
//! atomic indexed write/delete pipelines, set membership and pub/sub.

use futures_util::stream::{BoxStream, StreamExt};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::cache::CacheConfig;
use crate::InfrastructureError;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache client with retry logic and command deadlines
///
/// Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Client handle, kept for dedicated pub/sub connections
    client: Client,
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts for an operation
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use ac_infra::cache::{CacheConfig, RedisClient};
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::new("redis://localhost:6379").with_prefix("access");
    ///     let client = RedisClient::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, 3, 100).await
    }

    /// Create a new Redis client with custom retry configuration
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_retries` - Maximum number of attempts
    /// * `retry_delay_ms` - Base delay between retries in milliseconds
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        if config.command_timeout_ms == 0 {
            return Err(InfrastructureError::Config(
                "Redis command timeout must be positive".to_string(),
            ));
        }

        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(
            &client,
            Duration::from_secs(config.connection_timeout),
            max_retries,
            retry_delay_ms,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self {
            client,
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        connect_timeout: Duration,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let outcome = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Timeout {
                    operation: "Redis connect".to_string(),
                    after_ms: connect_timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Set a value with expiration time
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `value` - Value to cache
    /// * `expiry_seconds` - Time to live in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.execute_with_retry("SET", |mut conn| {
            let key = key.to_string();
            let value = value.to_string();

            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
    }

    /// Get a value from cache
    ///
    /// # Returns
    /// * `Result<Option<String>, InfrastructureError>` - Cached value or None if not found
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        debug!("Getting key '{}'", key);

        self.execute_with_retry("GET", |mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Result<bool, InfrastructureError>` - True if key was deleted, false if not found
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", key);

        let deleted = self
            .execute_with_retry("DEL", |mut conn| {
                let key = key.to_string();

                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Set `key` and add `member` to every set in `indexes` in one MULTI/EXEC.
    ///
    /// Index expiry is set when absent and otherwise only ever extended,
    /// which needs `EXPIRE ... NX|GT` (Redis 7).
    pub async fn set_with_members(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
        indexes: &[String],
        member: &str,
    ) -> Result<(), InfrastructureError> {
        debug!("Setting key '{}' with expiry {}s into {} indexes", key, expiry_seconds, indexes.len());

        self.execute_with_retry("MULTI SET SADD", |mut conn| {
            let mut pipe = redis::pipe();
            pipe.atomic().set_ex(key, value, expiry_seconds).ignore();
            for index in indexes {
                pipe.sadd(index, member).ignore();
                pipe.cmd("EXPIRE").arg(index).arg(expiry_seconds).arg("NX").ignore();
                pipe.cmd("EXPIRE").arg(index).arg(expiry_seconds).arg("GT").ignore();
            }

            Box::pin(async move { pipe.query_async::<_, ()>(&mut conn).await })
        })
        .await
    }

    /// Delete `key` and remove `member` from every set in `indexes` in one MULTI/EXEC
    pub async fn delete_with_members(
        &self,
        key: &str,
        indexes: &[String],
        member: &str,
    ) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}' from {} indexes", key, indexes.len());

        let (deleted,): (u32,) = self
            .execute_with_retry("MULTI DEL SREM", |mut conn| {
                let mut pipe = redis::pipe();
                pipe.atomic().del(key);
                for index in indexes {
                    pipe.srem(index, member).ignore();
                }

                Box::pin(async move { pipe.query_async::<_, (u32,)>(&mut conn).await })
            })
            .await?;
        Ok(deleted > 0)
    }

    /// Members of a set
    pub async fn members(&self, key: &str) -> Result<Vec<String>, InfrastructureError> {
        debug!("Reading members of '{}'", key);

        self.execute_with_retry("SMEMBERS", |mut conn| {
            let key = key.to_string();

            Box::pin(async move { conn.smembers::<_, Vec<String>>(key).await })
        })
        .await
    }

    /// Publish a message, returning the number of subscribers that received it
    pub async fn publish(&self, channel: &str, message: &str) -> Result<usize, InfrastructureError> {
        self.execute_with_retry("PUBLISH", |mut conn| {
            let channel = channel.to_string();
            let message = message.to_string();

            Box::pin(async move { conn.publish::<_, _, usize>(channel, message).await })
        })
        .await
    }

    /// Subscribe to a channel on a dedicated connection
    ///
    /// Payloads that are not UTF-8 are skipped. The stream ends when the
    /// connection drops.
    pub async fn subscribe(&self, channel: &str) -> Result<BoxStream<'static, String>, InfrastructureError> {
        let connection = self.client.get_async_connection().await?;
        let mut pubsub = connection.into_pubsub();
        pubsub.subscribe(channel).await?;
        info!(channel, "Subscribed to Redis channel");

        Ok(pubsub
            .into_on_message()
            .filter_map(|msg| async move { msg.get_payload::<String>().ok() })
            .boxed())
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry("PING", |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    /// Execute a Redis operation with a deadline per attempt and retry on
    /// transient errors. A deadline miss is not retried.
    async fn execute_with_retry<F, T>(&self, operation: &str, command: F) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let deadline = self.config.command_timeout();
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match timeout(deadline, command(conn)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis {} failed (attempt {}/{}): {}. Retrying in {}ms...",
                        operation, attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Ok(Err(e)) => {
                    error!("Redis {} failed after {} attempts: {}", operation, attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
                Err(_) => {
                    error!("Redis {} exceeded its {}ms deadline", operation, deadline.as_millis());
                    return Err(InfrastructureError::Timeout {
                        operation: format!("Redis {}", operation),
                        after_ms: deadline.as_millis() as u64,
                    });
                }
            }
        }
    }
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
