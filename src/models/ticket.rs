use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TransitionError;

/// Статус выпущенного билета.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Available,
    Held,
    Sold,
    Unavailable,
}

/// Все допустимые переходы `(откуда, куда)`. Других не бывает.
/// SOLD и UNAVAILABLE конечные: из них переходов нет.
const TRANSITIONS: &[(TicketStatus, TicketStatus)] = &[
    // начало оформления заказа
    (TicketStatus::Available, TicketStatus::Held),
    // истечение брони или явная отмена
    (TicketStatus::Held, TicketStatus::Available),
    // оплата прошла
    (TicketStatus::Held, TicketStatus::Sold),
];

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Available,
        TicketStatus::Held,
        TicketStatus::Sold,
        TicketStatus::Unavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Available => "AVAILABLE",
            TicketStatus::Held => "HELD",
            TicketStatus::Sold => "SOLD",
            TicketStatus::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn can_transition_to(self, to: TicketStatus) -> bool {
        TRANSITIONS.contains(&(self, to))
    }

    /// Единственная точка проверки переходов статуса.
    pub fn transition(self, to: TicketStatus) -> Result<TicketStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// Статусы, из которых разрешён переход в `to`.
    pub fn sources_of(to: TicketStatus) -> impl Iterator<Item = TicketStatus> {
        TRANSITIONS
            .iter()
            .filter(move |(_, target)| *target == to)
            .map(|(source, _)| *source)
    }

    /// Место нельзя выбрать на схеме.
    pub fn is_booked(self) -> bool {
        matches!(self, TicketStatus::Held | TicketStatus::Sold)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Выпущенный билет на конкретное место события.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedTicket {
    pub id: i64,
    pub event_id: i64,
    pub seat: String,
    pub class: String,
    pub class_color: String,
    pub price: f64,
    pub status: TicketStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
}

impl IssuedTicket {
    /// Бронь истекла и билет должен вернуться в продажу.
    pub fn is_stale_hold(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Held && self.hold_expires_at.is_some_and(|at| at < now)
    }
}

/// Билет до сохранения в хранилище.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicket {
    pub event_id: i64,
    pub seat: String,
    pub class: String,
    pub class_color: String,
    pub price: f64,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn legal_transitions_pass() {
        assert_eq!(TicketStatus::Available.transition(TicketStatus::Held), Ok(TicketStatus::Held));
        assert_eq!(TicketStatus::Held.transition(TicketStatus::Available), Ok(TicketStatus::Available));
        assert_eq!(TicketStatus::Held.transition(TicketStatus::Sold), Ok(TicketStatus::Sold));
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let err = TicketStatus::Unavailable.transition(TicketStatus::Held).unwrap_err();
        assert_eq!(err.from, TicketStatus::Unavailable);
        assert_eq!(err.to, TicketStatus::Held);

        assert!(!TicketStatus::Available.can_transition_to(TicketStatus::Sold));
        assert!(!TicketStatus::Held.can_transition_to(TicketStatus::Held));
        assert!(!TicketStatus::Sold.can_transition_to(TicketStatus::Held));
    }

    #[test]
    fn sources_follow_the_table() {
        assert_eq!(
            TicketStatus::sources_of(TicketStatus::Available).collect::<Vec<_>>(),
            vec![TicketStatus::Held]
        );
        assert_eq!(
            TicketStatus::sources_of(TicketStatus::Unavailable).count(),
            0
        );
        assert_eq!(
            TicketStatus::sources_of(TicketStatus::Held).collect::<Vec<_>>(),
            vec![TicketStatus::Available]
        );
    }

    #[test]
    fn sold_and_unavailable_are_terminal() {
        for to in TicketStatus::ALL {
            assert!(!TicketStatus::Unavailable.can_transition_to(to));
            assert!(!TicketStatus::Sold.can_transition_to(to));
        }
        assert_eq!(
            TicketStatus::Sold.transition(TicketStatus::Available),
            Err(TransitionError { from: TicketStatus::Sold, to: TicketStatus::Available })
        );
        assert!(TicketStatus::Available.transition(TicketStatus::Unavailable).is_err());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>(), Ok(status));
        }
        assert_eq!("CLAIMED".parse::<TicketStatus>(), Err("CLAIMED".to_string()));
    }

    #[test]
    fn stale_hold_needs_past_deadline() {
        let now = Utc::now();
        let mut ticket = IssuedTicket {
            id: 1,
            event_id: 1,
            seat: "A1".to_string(),
            class: "Standard".to_string(),
            class_color: "#fff".to_string(),
            price: 10.0,
            status: TicketStatus::Held,
            hold_expires_at: Some(now - Duration::seconds(1)),
        };
        assert!(ticket.is_stale_hold(now));

        ticket.hold_expires_at = Some(now + Duration::minutes(5));
        assert!(!ticket.is_stale_hold(now));

        ticket.status = TicketStatus::Sold;
        ticket.hold_expires_at = Some(now - Duration::minutes(5));
        assert!(!ticket.is_stale_hold(now));
    }
}
