//! Настройка тарифов зала.
//!
//! Организатор выбирает на схеме область, назначает ей тариф, и на выходе
//! получается конфигурация `{ seatClasses, seatAssignments, configuredSeats }`. Из неё для
//! события выпускается по одному билету на каждое место схемы.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use validator::Validate;

use crate::error::VenueError;
use crate::models::venue::distinct;
use crate::models::{NewTicket, SeatTier, TicketStatus, VenueLayout};
use crate::seatmap::{GridPos, SeatSelectionModel, SelectionRegion};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueConfig {
    pub seat_classes: Vec<SeatTier>,
    /// seat id -> tier id. Места без записи получают стандартный тариф.
    #[serde(default)]
    pub seat_assignments: BTreeMap<String, String>,
    /// Область схемы, доступная для выбора. Без неё доступна вся сетка.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_seats: Option<SelectionRegion>,
}

impl VenueConfig {
    pub fn new(seat_classes: Vec<SeatTier>) -> Self {
        Self {
            seat_classes,
            seat_assignments: BTreeMap::new(),
            configured_seats: None,
        }
    }

    /// Проверяет конфигурацию против схемы зала.
    ///
    /// Ссылка на несуществующий тариф ошибкой не считается: такое место
    /// получает стандартный тариф. А вот отсутствие стандартного тарифа
    /// и назначения на места, которых нет в схеме, отклоняются.
    pub fn validate(&self, layout: &VenueLayout) -> Result<(), VenueError> {
        for tier in &self.seat_classes {
            tier.validate().map_err(|errors| VenueError::InvalidTier {
                id: tier.id.clone(),
                reason: errors.to_string(),
            })?;
        }

        distinct(self.seat_classes.iter().map(|tier| tier.id.as_str()))
            .map_err(VenueError::DuplicateTier)?;

        self.standard_tier()?;

        if let Some(seat_id) = self
            .seat_assignments
            .keys()
            .find(|seat_id| !layout.contains_seat(seat_id))
        {
            return Err(VenueError::UnknownSeat(seat_id.clone()));
        }

        if let Some(region) = self.configured_seats {
            let corner = region.end();
            if layout.cell(corner).is_none() {
                return Err(VenueError::RegionOutOfBounds(corner));
            }
        }

        Ok(())
    }

    pub fn tier(&self, tier_id: &str) -> Option<&SeatTier> {
        self.seat_classes.iter().find(|tier| tier.id == tier_id)
    }

    pub fn standard_tier(&self) -> Result<&SeatTier, VenueError> {
        self.seat_classes
            .iter()
            .find(|tier| tier.is_standard())
            .ok_or(VenueError::MissingStandardTier)
    }

    /// Тариф места с откатом на стандартный.
    pub fn tier_for_seat(&self, seat_id: &str) -> Result<&SeatTier, VenueError> {
        match self.seat_assignments.get(seat_id) {
            Some(tier_id) => match self.tier(tier_id) {
                Some(tier) => Ok(tier),
                None => {
                    debug!("Seat {} references unknown class {}, using standard", seat_id, tier_id);
                    self.standard_tier()
                }
            },
            None => self.standard_tier(),
        }
    }

    /// Назначает тариф всем местам текущего выбора. Возвращает число назначенных мест.
    pub fn assign_selection(
        &mut self,
        layout: &VenueLayout,
        model: &SeatSelectionModel,
        tier_id: &str,
    ) -> Result<usize, VenueError> {
        if self.tier(tier_id).is_none() {
            return Err(VenueError::UnknownTier(tier_id.to_string()));
        }

        let seat_ids = model.selected_seat_ids(layout);
        for seat_id in &seat_ids {
            self.seat_assignments
                .insert(seat_id.to_string(), tier_id.to_string());
        }
        Ok(seat_ids.len())
    }

    /// Модель выбора для схемы с раскраской по областям тарифов.
    pub fn selection_model(&self, layout: &VenueLayout) -> SeatSelectionModel {
        let mut model = SeatSelectionModel::for_layout(layout);
        if let Some(region) = self.configured_seats {
            model = model.with_enabled_region(region);
        }
        self.seat_classes
            .iter()
            .filter_map(|tier| tier.region.map(|region| (tier, region)))
            .fold(model, |model, (tier, region)| {
                model.with_tier_region(&tier.id, &tier.color_code, region)
            })
    }

    /// Билеты события: по одному на место, в порядке обхода схемы.
    pub fn generate_tickets(
        &self,
        event_id: i64,
        layout: &VenueLayout,
    ) -> Result<Vec<NewTicket>, VenueError> {
        self.validate(layout)?;

        layout
            .seats()
            .map(|(_, seat_id)| -> Result<NewTicket, VenueError> {
                let tier = self.tier_for_seat(seat_id)?;
                let status = if tier.is_unavailable() {
                    TicketStatus::Unavailable
                } else {
                    TicketStatus::Available
                };
                Ok(NewTicket {
                    event_id,
                    seat: seat_id.to_string(),
                    class: tier.name.clone(),
                    class_color: tier.color_code.clone(),
                    price: tier.effective_price(),
                    status,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, STANDARD_TIER_ID, UNAVAILABLE_TIER_ID};
    use crate::seatmap::CellColor;

    fn tier(id: &str, price: f64, color: &str) -> SeatTier {
        SeatTier {
            id: id.to_string(),
            name: id.to_uppercase(),
            price,
            color_code: color.to_string(),
            region: None,
        }
    }

    fn layout() -> VenueLayout {
        VenueLayout::new(vec![
            vec![Cell::Stage, Cell::Stage, Cell::Stage],
            vec![Cell::seat("A1"), Cell::Aisle, Cell::seat("A2")],
            vec![Cell::seat("B1"), Cell::Aisle, Cell::seat("B2")],
        ])
        .unwrap()
    }

    fn config() -> VenueConfig {
        VenueConfig::new(vec![
            tier(STANDARD_TIER_ID, 50.0, "#10b981"),
            tier("vip", 150.0, "#f59e0b"),
            tier(UNAVAILABLE_TIER_ID, 99.0, "#374151"),
        ])
    }

    #[test]
    fn missing_standard_tier_is_an_error() {
        let config = VenueConfig::new(vec![tier("vip", 150.0, "#f59e0b")]);
        assert_eq!(config.validate(&layout()), Err(VenueError::MissingStandardTier));
    }

    #[test]
    fn standard_tier_is_matched_by_name() {
        let mut named = tier("base", 40.0, "#fff");
        named.name = "Standard".to_string();
        let config = VenueConfig::new(vec![named]);
        assert_eq!(config.standard_tier().unwrap().id, "base");
    }

    #[test]
    fn rejects_assignments_to_unknown_seats() {
        let mut config = config();
        config.seat_assignments.insert("Z9".to_string(), "vip".to_string());
        assert_eq!(
            config.validate(&layout()),
            Err(VenueError::UnknownSeat("Z9".to_string()))
        );
    }

    #[test]
    fn rejects_duplicate_and_invalid_tiers() {
        let mut config = config();
        config.seat_classes.push(tier("vip", 10.0, "#000"));
        assert_eq!(
            config.validate(&layout()),
            Err(VenueError::DuplicateTier("vip".to_string()))
        );

        let config = VenueConfig::new(vec![tier(STANDARD_TIER_ID, -5.0, "#fff")]);
        assert!(matches!(
            config.validate(&layout()),
            Err(VenueError::InvalidTier { .. })
        ));
    }

    #[test]
    fn unknown_tier_falls_back_to_standard() {
        let mut config = config();
        config.seat_assignments.insert("A1".to_string(), "balcony".to_string());
        assert_eq!(config.tier_for_seat("A1").unwrap().id, STANDARD_TIER_ID);
        assert_eq!(config.tier_for_seat("B2").unwrap().id, STANDARD_TIER_ID);
    }

    #[test]
    fn assigns_tier_to_selected_seats_only() {
        let layout = layout();
        let mut config = config();
        let mut model = config.selection_model(&layout);
        model.on_pointer_enter_grid();
        model.begin_drag(1, 0);
        model.extend_drag(1, 2);
        model.end_drag();

        assert_eq!(config.assign_selection(&layout, &model, "vip"), Ok(2));
        assert_eq!(config.seat_assignments.len(), 2);
        assert_eq!(config.tier_for_seat("A2").unwrap().id, "vip");

        assert_eq!(
            config.assign_selection(&layout, &model, "balcony"),
            Err(VenueError::UnknownTier("balcony".to_string()))
        );
    }

    #[test]
    fn selection_model_uses_tier_regions() {
        let mut config = config();
        config.seat_classes[1].region = Some(SelectionRegion::spanning(
            GridPos::new(1, 0),
            GridPos::new(1, 2),
        ));
        let model = config.selection_model(&layout());
        assert_eq!(model.cell_color(1, 1), CellColor::Tier("#f59e0b"));
        assert_eq!(model.tier_at(1, 0), Some("vip"));
        assert_eq!(model.cell_color(2, 0), CellColor::Unassigned);
    }

    #[test]
    fn configured_seats_limit_the_selectable_area() {
        let mut config = config();
        config.configured_seats = Some(SelectionRegion::spanning(
            GridPos::new(1, 0),
            GridPos::new(2, 0),
        ));
        assert_eq!(config.validate(&layout()), Ok(()));

        let mut model = config.selection_model(&layout());
        assert!(model.is_enabled(2, 0));
        assert_eq!(model.cell_color(1, 2), CellColor::Disabled);

        model.on_pointer_enter_grid();
        model.begin_drag(1, 0);
        model.extend_drag(2, 2);
        model.end_drag();
        assert_eq!(config.assign_selection(&layout(), &model, "vip"), Ok(2));
        assert_eq!(config.tier_for_seat("B1").unwrap().id, "vip");
        assert_eq!(config.tier_for_seat("B2").unwrap().id, STANDARD_TIER_ID);
    }

    #[test]
    fn configured_seats_must_fit_the_layout() {
        let mut config = config();
        config.configured_seats = Some(SelectionRegion::spanning(
            GridPos::new(0, 0),
            GridPos::new(3, 1),
        ));
        assert_eq!(
            config.validate(&layout()),
            Err(VenueError::RegionOutOfBounds(GridPos::new(3, 1)))
        );
    }

    #[test]
    fn generates_one_ticket_per_seat() {
        let mut config = config();
        config.seat_assignments.insert("A1".to_string(), "vip".to_string());
        config
            .seat_assignments
            .insert("B2".to_string(), UNAVAILABLE_TIER_ID.to_string());

        let tickets = config.generate_tickets(7, &layout()).unwrap();
        assert_eq!(tickets.len(), 4);

        let seats: Vec<&str> = tickets.iter().map(|t| t.seat.as_str()).collect();
        assert_eq!(seats, vec!["A1", "A2", "B1", "B2"]);

        assert_eq!(tickets[0].class, "VIP");
        assert_eq!(tickets[0].price, 150.0);
        assert_eq!(tickets[1].status, TicketStatus::Available);
        assert_eq!(tickets[3].status, TicketStatus::Unavailable);
        assert_eq!(tickets[3].price, 0.0);
        assert!(tickets.iter().all(|t| t.event_id == 7));
    }

    #[test]
    fn payload_uses_camel_case() {
        let config: VenueConfig = serde_json::from_str(
            r##"{
                "seatClasses": [{"id":"standard","name":"Standard","price":10,"colorCode":"#fff"}],
                "seatAssignments": {"A1": "standard"}
            }"##,
        )
        .unwrap();
        assert_eq!(config.seat_classes[0].color_code, "#fff");
        assert_eq!(config.seat_assignments["A1"], STANDARD_TIER_ID);
        assert_eq!(config.configured_seats, None);

        let config: VenueConfig = serde_json::from_str(
            r##"{
                "seatClasses": [{"id":"standard","name":"Standard","price":10,"colorCode":"#fff"}],
                "configuredSeats": {"startPos": {"row": 2, "col": 1}, "endPos": {"row": 0, "col": 0}}
            }"##,
        )
        .unwrap();
        assert_eq!(
            config.configured_seats,
            Some(SelectionRegion::spanning(GridPos::new(0, 0), GridPos::new(2, 1)))
        );
    }
}
