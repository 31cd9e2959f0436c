use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::TicketStore;
use crate::error::StoreError;
use crate::models::{IssuedTicket, NewTicket, TicketStatus};

#[derive(Default)]
struct Inner {
    tickets: BTreeMap<i64, IssuedTicket>,
    next_id: i64,
}

/// Хранилище в памяти процесса. Используется в тестах и локальных прогонах.
#[derive(Default)]
pub struct MemoryTicketStore {
    inner: Mutex<Inner>,
    release_calls: AtomicU64,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: i64) -> Option<IssuedTicket> {
        self.inner.lock().await.tickets.get(&id).cloned()
    }

    /// Сколько раз вызывалось пакетное освобождение броней.
    pub fn release_calls(&self) -> u64 {
        self.release_calls.load(Ordering::Relaxed)
    }

    /// Переводит билет в новый статус через таблицу переходов.
    pub async fn set_status(&self, id: i64, to: TicketStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(ticket) = inner.tickets.get_mut(&id) {
            ticket.status = ticket.status.transition(to)?;
            if to != TicketStatus::Held {
                ticket.hold_expires_at = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn find_expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<IssuedTicket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|ticket| ticket.is_stale_hold(now))
            .cloned()
            .collect())
    }

    async fn count_expired_holds(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|ticket| ticket.is_stale_hold(now))
            .count() as i64)
    }

    async fn release_holds(&self, ids: &[i64], now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.release_calls.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock().await;
        let mut released = 0;
        for id in ids {
            let Some(ticket) = inner.tickets.get_mut(id) else { continue };
            if !ticket.is_stale_hold(now) {
                continue;
            }
            ticket.status = ticket.status.transition(TicketStatus::Available)?;
            ticket.hold_expires_at = None;
            released += 1;
        }
        Ok(released)
    }

    async fn hold(&self, ids: &[i64], expires_at: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut held = 0;
        for id in ids {
            let Some(ticket) = inner.tickets.get_mut(id) else { continue };
            if let Ok(status) = ticket.status.transition(TicketStatus::Held) {
                ticket.status = status;
                ticket.hold_expires_at = Some(expires_at);
                held += 1;
            }
        }
        Ok(held)
    }

    async fn replace_event_tickets(
        &self,
        event_id: i64,
        tickets: &[NewTicket],
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let booked = inner
            .tickets
            .values()
            .any(|ticket| ticket.event_id == event_id && ticket.status.is_booked());
        if booked {
            return Err(StoreError::EventHasBookings(event_id));
        }
        inner.tickets.retain(|_, ticket| ticket.event_id != event_id);
        for ticket in tickets {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.tickets.insert(
                id,
                IssuedTicket {
                    id,
                    event_id: ticket.event_id,
                    seat: ticket.seat.clone(),
                    class: ticket.class.clone(),
                    class_color: ticket.class_color.clone(),
                    price: ticket.price,
                    status: ticket.status,
                    hold_expires_at: None,
                },
            );
        }
        Ok(tickets.len() as u64)
    }

    async fn event_tickets(&self, event_id: i64) -> Result<Vec<IssuedTicket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|ticket| ticket.event_id == event_id)
            .cloned()
            .collect())
    }
}
