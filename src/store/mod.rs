//! Хранилище выпущенных билетов.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{IssuedTicket, NewTicket};

pub mod memory;
pub mod postgres;

pub use memory::MemoryTicketStore;
pub use postgres::PgTicketStore;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Билеты в статусе HELD, чья бронь истекла раньше `now`.
    async fn find_expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<IssuedTicket>, StoreError>;

    async fn count_expired_holds(&self, now: DateTime<Utc>) -> Result<i64, StoreError>;

    /// Одним обновлением возвращает в продажу ровно перечисленные билеты.
    ///
    /// Обновляются только те, что всё ещё HELD с истёкшей на `now` бронью:
    /// билет, который успели выкупить или продлить между выборкой и
    /// обновлением, не трогается. Возвращает число обновлённых строк.
    async fn release_holds(&self, ids: &[i64], now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Переводит доступные билеты в HELD до `expires_at`. Возвращает число обновлённых строк.
    async fn hold(&self, ids: &[i64], expires_at: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Заменяет все билеты события новым набором.
    /// Отказывает с `EventHasBookings`, если хоть один билет события HELD или SOLD.
    async fn replace_event_tickets(
        &self,
        event_id: i64,
        tickets: &[NewTicket],
    ) -> Result<u64, StoreError>;

    async fn event_tickets(&self, event_id: i64) -> Result<Vec<IssuedTicket>, StoreError>;
}
