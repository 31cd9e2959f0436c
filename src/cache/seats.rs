use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::CacheService;
use crate::error::{CacheError, StoreError};
use crate::models::{IssuedTicket, TicketStatus};
use crate::store::TicketStore;

/// Состояние места события для отрисовки схемы.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatState {
    pub seat: String,
    pub class: String,
    pub class_color: String,
    pub price: f64,
    pub status: TicketStatus,
}

impl From<IssuedTicket> for SeatState {
    fn from(ticket: IssuedTicket) -> Self {
        Self {
            seat: ticket.seat,
            class: ticket.class,
            class_color: ticket.class_color,
            price: ticket.price,
            status: ticket.status,
        }
    }
}

fn seats_key(event_id: i64) -> String {
    format!("seats:{}", event_id)
}

impl CacheService {
    /// Места события: сначала кеш, при промахе или сбое Redis - БД.
    pub async fn get_seats(&self, event_id: i64) -> Result<Vec<SeatState>, StoreError> {
        match self.get_seats_from_cache(event_id).await {
            Ok(Some(seats)) => return Ok(seats),
            Ok(None) => {}
            Err(e) => warn!("Seats cache read failed for event {}: {}", event_id, e),
        }

        let seats: Vec<SeatState> = self
            .tickets
            .event_tickets(event_id)
            .await?
            .into_iter()
            .map(SeatState::from)
            .collect();

        if let Err(e) = self.save_seats_to_cache(event_id, &seats).await {
            warn!("Seats cache write failed for event {}: {}", event_id, e);
        }
        Ok(seats)
    }

    // Инвалидировать кеш мест
    pub async fn invalidate_seats(&self, event_id: i64) {
        let mut conn = self.redis.conn.clone();
        let result: Result<(), _> = conn.del(seats_key(event_id)).await;
        match result {
            Ok(()) => info!("Invalidated seats cache for event {}", event_id),
            Err(e) => warn!("Failed to invalidate seats cache for event {}: {}", event_id, e),
        }
    }

    async fn get_seats_from_cache(&self, event_id: i64) -> Result<Option<Vec<SeatState>>, CacheError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(seats_key(event_id)).await?;
        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn save_seats_to_cache(&self, event_id: i64, seats: &[SeatState]) -> Result<(), CacheError> {
        let data = serde_json::to_string(seats)?;
        let mut conn = self.redis.conn.clone();
        let () = conn.set_ex(seats_key(event_id), data, self.seats_ttl).await?;
        Ok(())
    }
}
