pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod redis_client;
pub mod seatmap;
pub mod services;
pub mod store;
pub mod venue;

use std::sync::Arc;
use tracing::info;

use store::PgTicketStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub config: config::Config,
    pub tickets: Arc<PgTicketStore>,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::connect(&config.database).await?;
        info!("Database connected");

        db.run_migrations().await?;

        let redis = redis_client::RedisClient::connect(&config.redis.url).await?;
        info!("Redis connected");

        let tickets = PgTicketStore::new(db.pool.clone());
        let cache = cache::CacheService::new(redis.clone(), tickets.clone(), config.redis.seats_ttl_seconds);

        Ok(Arc::new(Self {
            db,
            redis,
            cache,
            config,
            tickets: Arc::new(tickets),
        }))
    }
}
