use crate::{error::StoreError, redis_client::RedisClient, store::PgTicketStore};
use tracing::{debug, info, warn};

pub mod seats;

pub use seats::SeatState;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    tickets: PgTicketStore,
    seats_ttl: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, tickets: PgTicketStore, seats_ttl: u64) -> Self {
        Self { redis, tickets, seats_ttl }
    }

    // Прогрев кеша при старте. Возвращает число прогретых событий
    pub async fn warmup_cache(&self) -> usize {
        info!("Starting cache warmup...");

        let event_ids = match self.tickets.event_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Cache warmup skipped: {}", e);
                return 0;
            }
        };

        let mut warmed = 0;
        for event_id in &event_ids {
            let result = self.get_seats(*event_id).await.map(|seats| seats.len());
            if warmed_event(*event_id, result) {
                warmed += 1;
            }
        }

        info!("Cache warmup done, {}/{} events", warmed, event_ids.len());
        warmed
    }
}

// Ошибка одного события не останавливает прогрев остальных
fn warmed_event(event_id: i64, result: Result<usize, StoreError>) -> bool {
    match result {
        Ok(seats) => {
            debug!("🔥 Event {} warmed up, {} seats", event_id, seats);
            true
        }
        Err(e) => {
            warn!("Cache warmup failed for event {}: {}", event_id, e);
            false
        }
    }
}
