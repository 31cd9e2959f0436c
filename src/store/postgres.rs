use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::TicketStore;
use crate::error::StoreError;
use crate::models::{IssuedTicket, NewTicket, TicketStatus};

// Строка таблицы tickets как она лежит в БД
#[derive(Debug, FromRow)]
struct TicketRow {
    id: i64,
    event_id: i64,
    seat: String,
    class: String,
    class_color: String,
    price: f64,
    status: String,
    hold_expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<TicketRow> for IssuedTicket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(StoreError::UnknownStatus)?;
        Ok(IssuedTicket {
            id: row.id,
            event_id: row.event_id,
            seat: row.seat,
            class: row.class,
            class_color: row.class_color,
            price: row.price,
            status,
            hold_expires_at: row.hold_expires_at,
        })
    }
}

fn into_tickets(rows: Vec<TicketRow>) -> Result<Vec<IssuedTicket>, StoreError> {
    rows.into_iter().map(IssuedTicket::try_from).collect()
}

fn status_names(statuses: impl Iterator<Item = TicketStatus>) -> Vec<String> {
    statuses.map(|status| status.as_str().to_string()).collect()
}

/// Хранилище билетов в Postgres
#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// События, для которых выпущены билеты.
    pub async fn event_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT DISTINCT event_id FROM tickets ORDER BY event_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn find_expired_holds(&self, now: DateTime<Utc>) -> Result<Vec<IssuedTicket>, StoreError> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, event_id, seat, class, class_color, price, status, hold_expires_at
            FROM tickets
            WHERE status = $1 AND hold_expires_at < $2
            ORDER BY id
            "#
        )
        .bind(TicketStatus::Held.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        into_tickets(rows)
    }

    async fn count_expired_holds(&self, now: DateTime<Utc>) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE status = $1 AND hold_expires_at < $2"
        )
        .bind(TicketStatus::Held.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn release_holds(&self, ids: &[i64], now: DateTime<Utc>) -> Result<u64, StoreError> {
        let target = TicketStatus::Held.transition(TicketStatus::Available)?;

        // Условие по статусу и сроку повторяется, чтобы не отпустить
        // билет, выкупленный или продлённый после выборки.
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = $1, hold_expires_at = NULL, updated_at = NOW()
            WHERE id = ANY($2) AND status = $3 AND hold_expires_at < $4
            "#
        )
        .bind(target.as_str())
        .bind(ids)
        .bind(TicketStatus::Held.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn hold(&self, ids: &[i64], expires_at: DateTime<Utc>) -> Result<u64, StoreError> {
        let sources = status_names(TicketStatus::sources_of(TicketStatus::Held));

        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = $1, hold_expires_at = $2, updated_at = NOW()
            WHERE id = ANY($3) AND status = ANY($4)
            "#
        )
        .bind(TicketStatus::Held.as_str())
        .bind(expires_at)
        .bind(ids)
        .bind(&sources)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn replace_event_tickets(
        &self,
        event_id: i64,
        tickets: &[NewTicket],
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Блокируем строки события до конца транзакции, чтобы бронь
        // не проскочила между проверкой и удалением
        let statuses = sqlx::query_scalar::<_, String>(
            "SELECT status FROM tickets WHERE event_id = $1 FOR UPDATE"
        )
        .bind(event_id)
        .fetch_all(&mut *tx)
        .await?;

        for status in &statuses {
            let status: TicketStatus = status.parse().map_err(StoreError::UnknownStatus)?;
            if status.is_booked() {
                tx.rollback().await?;
                return Err(StoreError::EventHasBookings(event_id));
            }
        }

        sqlx::query("DELETE FROM tickets WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        let seats: Vec<&str> = tickets.iter().map(|t| t.seat.as_str()).collect();
        let classes: Vec<&str> = tickets.iter().map(|t| t.class.as_str()).collect();
        let colors: Vec<&str> = tickets.iter().map(|t| t.class_color.as_str()).collect();
        let prices: Vec<f64> = tickets.iter().map(|t| t.price).collect();
        let statuses: Vec<&str> = tickets.iter().map(|t| t.status.as_str()).collect();

        // Вставка одним запросом через UNNEST
        let inserted = sqlx::query(
            r#"
            INSERT INTO tickets (event_id, seat, class, class_color, price, status)
            SELECT $1, seat, class, class_color, price, status
            FROM UNNEST($2::text[], $3::text[], $4::text[], $5::float8[], $6::text[])
                AS t(seat, class, class_color, price, status)
            "#
        )
        .bind(event_id)
        .bind(&seats)
        .bind(&classes)
        .bind(&colors)
        .bind(&prices)
        .bind(&statuses)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(inserted)
    }

    async fn event_tickets(&self, event_id: i64) -> Result<Vec<IssuedTicket>, StoreError> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, event_id, seat, class, class_color, price, status, hold_expires_at
            FROM tickets
            WHERE event_id = $1
            ORDER BY id
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        into_tickets(rows)
    }
}
