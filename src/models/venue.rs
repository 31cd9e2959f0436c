use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use validator::Validate;

use crate::error::VenueError;
use crate::seatmap::{GridPos, SelectionRegion};

pub const STANDARD_TIER_ID: &str = "standard";
pub const UNAVAILABLE_TIER_ID: &str = "unavailable";

/// Ячейка схемы зала.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Cell {
    Seat {
        #[serde(rename = "seatId")]
        seat_id: String,
    },
    Aisle,
    Empty,
    Stage,
}

impl Cell {
    pub fn seat(seat_id: impl Into<String>) -> Self {
        Cell::Seat { seat_id: seat_id.into() }
    }

    pub fn seat_id(&self) -> Option<&str> {
        match self {
            Cell::Seat { seat_id } => Some(seat_id),
            _ => None,
        }
    }
}

/// Прямоугольная схема зала. Все строки одной длины, id мест уникальны и не пустые.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct VenueLayout {
    rows: Vec<Vec<Cell>>,
    seat_index: HashMap<String, GridPos>,
}

impl VenueLayout {
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self, VenueError> {
        let expected = rows.first().map_or(0, Vec::len);
        let mut seat_index = HashMap::new();

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(VenueError::RaggedRow { row, expected, found: cells.len() });
            }
            for (col, cell) in cells.iter().enumerate() {
                let Some(seat_id) = cell.seat_id() else { continue };
                if seat_id.trim().is_empty() {
                    return Err(VenueError::EmptySeatId { row, col });
                }
                if seat_index.insert(seat_id.to_string(), GridPos::new(row, col)).is_some() {
                    return Err(VenueError::DuplicateSeatId(seat_id.to_string()));
                }
            }
        }

        Ok(Self { rows, seat_index })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.rows.get(pos.row)?.get(pos.col)
    }

    pub fn seat_id_at(&self, pos: GridPos) -> Option<&str> {
        self.cell(pos)?.seat_id()
    }

    pub fn position_of(&self, seat_id: &str) -> Option<GridPos> {
        self.seat_index.get(seat_id).copied()
    }

    pub fn contains_seat(&self, seat_id: &str) -> bool {
        self.seat_index.contains_key(seat_id)
    }

    pub fn seat_count(&self) -> usize {
        self.seat_index.len()
    }

    /// Места в порядке обхода схемы: построчно, слева направо.
    pub fn seats(&self) -> impl Iterator<Item = (GridPos, &str)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.seat_id().map(|id| (GridPos::new(row, col), id)))
        })
    }
}

impl TryFrom<Vec<Vec<Cell>>> for VenueLayout {
    type Error = VenueError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<VenueLayout> for Vec<Vec<Cell>> {
    fn from(layout: VenueLayout) -> Self {
        layout.rows
    }
}

/// Тариф (класс мест).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatTier {
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "color code must not be empty"))]
    pub color_code: String,
    /// Область схемы, которую тариф покрывает при отрисовке.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<SelectionRegion>,
}

impl SeatTier {
    pub fn is_standard(&self) -> bool {
        self.id == STANDARD_TIER_ID || self.name.eq_ignore_ascii_case(STANDARD_TIER_ID)
    }

    pub fn is_unavailable(&self) -> bool {
        self.id == UNAVAILABLE_TIER_ID
    }

    /// Цена продажи: непродаваемые места всегда стоят 0.
    pub fn effective_price(&self) -> f64 {
        if self.is_unavailable() {
            0.0
        } else {
            self.price
        }
    }
}

/// Возвращает первый повторившийся id, если такой есть.
pub(crate) fn distinct<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(id.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ids: &[&str]) -> Vec<Cell> {
        ids.iter()
            .map(|id| match *id {
                "_" => Cell::Aisle,
                "." => Cell::Empty,
                "S" => Cell::Stage,
                id => Cell::seat(id),
            })
            .collect()
    }

    #[test]
    fn builds_seat_index() {
        let layout = VenueLayout::new(vec![row(&["S", "S", "S"]), row(&["A1", "_", "A2"])]).unwrap();
        assert_eq!(layout.row_count(), 2);
        assert_eq!(layout.col_count(), 3);
        assert_eq!(layout.seat_count(), 2);
        assert_eq!(layout.position_of("A2"), Some(GridPos::new(1, 2)));
        assert_eq!(layout.seat_id_at(GridPos::new(1, 1)), None);
        let seats: Vec<&str> = layout.seats().map(|(_, id)| id).collect();
        assert_eq!(seats, vec!["A1", "A2"]);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = VenueLayout::new(vec![row(&["A1", "A2"]), row(&["B1"])]).unwrap_err();
        assert_eq!(err, VenueError::RaggedRow { row: 1, expected: 2, found: 1 });
    }

    #[test]
    fn rejects_duplicate_and_empty_seat_ids() {
        let err = VenueLayout::new(vec![row(&["A1", "A1"])]).unwrap_err();
        assert_eq!(err, VenueError::DuplicateSeatId("A1".to_string()));

        let err = VenueLayout::new(vec![vec![Cell::seat(" ")]]).unwrap_err();
        assert_eq!(err, VenueError::EmptySeatId { row: 0, col: 0 });
    }

    #[test]
    fn deserializes_tagged_cells() {
        let layout: VenueLayout = serde_json::from_str(
            r#"[[{"type":"stage"},{"type":"stage"}],[{"type":"seat","seatId":"A1"},{"type":"empty"}]]"#,
        )
        .unwrap();
        assert_eq!(layout.cell(GridPos::new(1, 0)), Some(&Cell::seat("A1")));
        assert_eq!(layout.cell(GridPos::new(1, 1)), Some(&Cell::Empty));
    }

    #[test]
    fn deserialization_rejects_invalid_layout() {
        let result: Result<VenueLayout, _> =
            serde_json::from_str(r#"[[{"type":"seat","seatId":"A1"}],[]]"#);
        assert!(result.is_err());
    }

    #[test]
    fn unavailable_tier_is_free() {
        let tier = SeatTier {
            id: UNAVAILABLE_TIER_ID.to_string(),
            name: "Blocked".to_string(),
            price: 120.0,
            color_code: "#000".to_string(),
            region: None,
        };
        assert_eq!(tier.effective_price(), 0.0);
        assert!(!tier.is_standard());
    }

    #[test]
    fn negative_price_fails_validation() {
        let tier = SeatTier {
            id: "vip".to_string(),
            name: "VIP".to_string(),
            price: -1.0,
            color_code: "#f00".to_string(),
            region: None,
        };
        assert!(tier.validate().is_err());
    }
}
