use actix_web::{web, HttpServer};
use anyhow::Context;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};

use ac_api::app::{create_app, AppState};
use ac_api::middleware::create_cors;
use ac_api::telemetry;
use ac_core::repositories::{MemoryTokenStore, TokenStore};
use ac_core::services::{AuthService, SessionEvent, SystemClock, TokenService, TokenServiceConfig};
use ac_infra::{
    BcryptPasswordVerifier, DatabasePool, HttpPermissionOracle, PgDirectoryRepository, RedisClient,
    RedisTokenStore,
};
use ac_shared::{AppConfig, TokenStoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(
        environment = ?config.environment,
        token_store = ?config.token_store,
        "Starting access core API"
    );

    let pool = DatabasePool::new(config.database.clone()).await?;
    let directory = Arc::new(PgDirectoryRepository::new(pool.get_pool().clone()));

    match config.token_store {
        TokenStoreBackend::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            if let Some(channel) = &config.cache.pubsub_channel {
                spawn_event_listener(client.clone(), channel.clone());
            }
            let store = Arc::new(RedisTokenStore::new(client));
            serve(&config, directory, store).await?;
        }
        TokenStoreBackend::Memory => {
            warn!("Using the in-process token store, sessions are lost on restart");
            serve(&config, directory, Arc::new(MemoryTokenStore::new())).await?;
        }
    }

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn serve<S: TokenStore + 'static>(
    config: &AppConfig,
    directory: Arc<PgDirectoryRepository>,
    store: Arc<S>,
) -> anyhow::Result<()> {
    let token_config = TokenServiceConfig::from_app_config(&config.auth, &config.cache);
    let mut tokens = TokenService::new(store, token_config, Arc::new(SystemClock))?;

    if let Some(permission) = &config.permission {
        let oracle = HttpPermissionOracle::new(permission)?;
        tokens = tokens.with_oracle(Arc::new(oracle));
        info!(url = %permission.api_url, "Permission checks enabled");
    }

    let auth = AuthService::new(directory, Arc::new(BcryptPasswordVerifier::new()), Arc::new(tokens));
    let state = web::Data::new(AppState::new(Arc::new(auth)));

    let environment = config.environment;
    let cors = config.cors.clone();
    let bind_address = config.server.bind_address();
    info!(address = %bind_address, workers = config.server.workers, "Binding HTTP server");

    let mut server = HttpServer::new(move || create_app(state.clone(), create_cors(environment, &cors)));
    // Zero keeps actix's default of one worker per core
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;
    Ok(())
}

/// Log session events published by any instance sharing the channel
fn spawn_event_listener(client: RedisClient, channel: String) {
    tokio::spawn(async move {
        let mut messages = match client.subscribe(&channel).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Session event listener not started");
                return;
            }
        };

        while let Some(payload) = messages.next().await {
            match serde_json::from_str::<SessionEvent>(&payload) {
                Ok(event) => info!(
                    event = ?event.event,
                    token_id = ?event.token_id,
                    scope = ?event.scope,
                    count = ?event.count,
                    "Session event"
                ),
                Err(e) => warn!(error = %e, "Ignoring malformed session event"),
            }
        }
        warn!(channel = %channel, "Session event stream closed");
    });
}
