//! Типы ошибок по слоям сервиса.

use thiserror::Error;

use crate::models::TicketStatus;
use crate::seatmap::GridPos;

/// Ошибки валидации схемы зала и конфигурации тарифов.
#[derive(Debug, Error, PartialEq)]
pub enum VenueError {
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("seat at ({row}, {col}) has an empty id")]
    EmptySeatId { row: usize, col: usize },

    #[error("seat id {0:?} appears more than once in the layout")]
    DuplicateSeatId(String),

    #[error("seat class {0:?} is defined more than once")]
    DuplicateTier(String),

    #[error("seat class {id:?} is invalid: {reason}")]
    InvalidTier { id: String, reason: String },

    #[error("no \"standard\" seat class is configured")]
    MissingStandardTier,

    #[error("seat assignment references unknown seat {0:?}")]
    UnknownSeat(String),

    #[error("seat class {0:?} does not exist")]
    UnknownTier(String),

    #[error("configured seats region reaches ({}, {}), outside the layout", .0.row, .0.col)]
    RegionOutOfBounds(GridPos),
}

/// Недопустимый переход статуса билета.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("ticket cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: TicketStatus,
    pub to: TicketStatus,
}

/// Ошибки хранилища билетов.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unknown ticket status {0:?} in store")]
    UnknownStatus(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("event {0} has held or sold tickets")]
    EventHasBookings(i64),
}

/// Ошибки кеша мест.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cached payload is corrupt: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Ошибки чтения конфигурации из окружения.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
