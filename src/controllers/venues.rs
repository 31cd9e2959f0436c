use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::VenueLayout;
use crate::services::reaper::HoldReaper;
use crate::store::TicketStore;
use crate::venue::VenueConfig;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{event_id}/seat-config", put(put_seat_config))
        .route("/events/{event_id}/seats", get(get_seats))
        .route("/holds/expired", get(get_expired_holds))
}

/* ---------- helpers ---------- */

fn check_event_id(event_id: i64) -> Result<(), (StatusCode, String)> {
    if event_id <= 0 {
        return Err((StatusCode::BAD_REQUEST, "event_id должен быть > 0".to_string()));
    }
    Ok(())
}

fn internal(context: &str, e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("{} failed: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Ошибка БД".to_string())
}

/* ---------- SEAT CONFIG ---------- */

// PUT /api/events/{event_id}/seat-config
#[derive(Debug, Deserialize)]
struct SeatConfigRequest {
    layout: VenueLayout,
    #[serde(flatten)]
    config: VenueConfig,
}

async fn put_seat_config(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(req): Json<SeatConfigRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_event_id(event_id)?;

    let tickets = req
        .config
        .generate_tickets(event_id, &req.layout)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    // Пересобирать билеты можно, только пока ни одно место не забронировано и не продано
    let inserted = state
        .tickets
        .replace_event_tickets(event_id, &tickets)
        .await
        .map_err(|e| match e {
            StoreError::EventHasBookings(_) => (
                StatusCode::CONFLICT,
                "У события есть забронированные или проданные билеты".to_string(),
            ),
            e => internal("put_seat_config", e),
        })?;

    state.cache.invalidate_seats(event_id).await;
    tracing::info!("🎟️ Event {} seat config saved, {} tickets issued", event_id, inserted);

    Ok((
        StatusCode::OK,
        Json(json!({ "event_id": event_id, "tickets": inserted })),
    ))
}

/* ---------- SEATS ---------- */

// GET /api/events/{event_id}/seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    check_event_id(event_id)?;

    let seats = state
        .cache
        .get_seats(event_id)
        .await
        .map_err(|e| internal("get_seats", e))?;

    Ok((StatusCode::OK, Json(seats)))
}

/* ---------- HOLDS ---------- */

// GET /api/holds/expired
async fn get_expired_holds(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let pending = HoldReaper::new(state.tickets.clone())
        .pending(Utc::now())
        .await
        .map_err(|e| internal("get_expired_holds", e))?;

    Ok((StatusCode::OK, Json(json!({ "pending": pending }))))
}
