//! Модель выбора мест на схеме зала.
//!
//! Не зависит от способа отрисовки: слой UI спрашивает у модели цвет и
//! состояние каждой ячейки и передаёт ей события указателя
//! (down / enter / up / leave) в порядке их поступления.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::grid::{GridPos, SelectionRegion};
use crate::models::VenueLayout;

/// Цвет ячейки до подстановки конкретной палитры.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "color", rename_all = "lowercase")]
pub enum CellColor<'a> {
    Disabled,
    Booked,
    Selected,
    Tier(&'a str),
    Unassigned,
}

/// Цвета служебных состояний ячейки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub disabled: String,
    pub booked: String,
    pub selected: String,
    pub unassigned: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            disabled: "#e5e7eb".to_string(),
            booked: "#9ca3af".to_string(),
            selected: "#2563eb".to_string(),
            unassigned: "#ffffff".to_string(),
        }
    }
}

impl Palette {
    pub fn resolve<'a>(&'a self, color: CellColor<'a>) -> &'a str {
        match color {
            CellColor::Disabled => &self.disabled,
            CellColor::Booked => &self.booked,
            CellColor::Selected => &self.selected,
            CellColor::Tier(code) => code,
            CellColor::Unassigned => &self.unassigned,
        }
    }
}

/// Состояние одной ячейки для слоя отрисовки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellState<'a> {
    pub color: CellColor<'a>,
    pub selected: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
struct TierRegion {
    tier_id: String,
    color_code: String,
    region: SelectionRegion,
}

/// Состояние выбора для одной сетки.
#[derive(Debug, Clone)]
pub struct SeatSelectionModel {
    rows: usize,
    cols: usize,
    enabled: Option<SelectionRegion>,
    booked: HashSet<usize>,
    tiers: Vec<TierRegion>,
    selection: BTreeSet<usize>,
    pointer_inside: bool,
    dragging: bool,
    anchor: Option<GridPos>,
}

impl SeatSelectionModel {
    /// Модель для сетки `rows x cols`, вся сетка доступна.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            enabled: SelectionRegion::whole(rows, cols),
            booked: HashSet::new(),
            tiers: Vec::new(),
            selection: BTreeSet::new(),
            pointer_inside: false,
            dragging: false,
            anchor: None,
        }
    }

    pub fn for_layout(layout: &VenueLayout) -> Self {
        Self::new(layout.row_count(), layout.col_count())
    }

    /// Ограничивает доступную для выбора область.
    pub fn with_enabled_region(mut self, region: SelectionRegion) -> Self {
        self.enabled = Some(region);
        self
    }

    pub fn with_tier_region(
        mut self,
        tier_id: impl Into<String>,
        color_code: impl Into<String>,
        region: SelectionRegion,
    ) -> Self {
        self.tiers.push(TierRegion {
            tier_id: tier_id.into(),
            color_code: color_code.into(),
            region,
        });
        self
    }

    pub fn mark_booked(&mut self, pos: GridPos) {
        self.booked.insert(pos.index(self.cols));
    }

    /// Помечает занятыми места по их идентификаторам. Неизвестные id пропускаются.
    pub fn mark_booked_seats<'s>(
        &mut self,
        layout: &VenueLayout,
        seat_ids: impl IntoIterator<Item = &'s str>,
    ) {
        for seat_id in seat_ids {
            if let Some(pos) = layout.position_of(seat_id) {
                self.mark_booked(pos);
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_enabled(&self, row: usize, col: usize) -> bool {
        self.enabled
            .is_some_and(|region| region.contains(GridPos::new(row, col)))
    }

    pub fn is_booked(&self, row: usize, col: usize) -> bool {
        self.booked.contains(&GridPos::new(row, col).index(self.cols))
    }

    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.selection.contains(&GridPos::new(row, col).index(self.cols))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Линейные индексы выбранных ячеек по возрастанию.
    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    pub fn selected_positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.selection
            .iter()
            .map(|&index| GridPos::from_index(index, self.cols))
    }

    /// Id мест среди выбранных ячеек; проходы, сцена, пустоты и
    /// недоступные ячейки пропускаются.
    pub fn selected_seat_ids<'l>(&self, layout: &'l VenueLayout) -> Vec<&'l str> {
        self.selected_positions()
            .filter(|pos| self.is_enabled(pos.row, pos.col))
            .filter_map(|pos| layout.seat_id_at(pos))
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Цвет ячейки. Правила проверяются сверху вниз, побеждает первое:
    /// недоступна, занята, выбрана, попадает в область тарифа, иначе без тарифа.
    pub fn cell_color(&self, row: usize, col: usize) -> CellColor<'_> {
        if !self.is_enabled(row, col) {
            return CellColor::Disabled;
        }
        if self.is_booked(row, col) {
            return CellColor::Booked;
        }
        if self.is_selected(row, col) {
            return CellColor::Selected;
        }
        let pos = GridPos::new(row, col);
        self.tiers
            .iter()
            .find(|tier| tier.region.contains(pos))
            .map_or(CellColor::Unassigned, |tier| CellColor::Tier(&tier.color_code))
    }

    /// Id тарифа, чья область покрывает ячейку.
    pub fn tier_at(&self, row: usize, col: usize) -> Option<&str> {
        let pos = GridPos::new(row, col);
        self.tiers
            .iter()
            .find(|tier| tier.region.contains(pos))
            .map(|tier| tier.tier_id.as_str())
    }

    pub fn cell_state(&self, row: usize, col: usize) -> CellState<'_> {
        CellState {
            color: self.cell_color(row, col),
            selected: self.is_selected(row, col),
            enabled: self.is_enabled(row, col),
        }
    }

    /// Переключает выбор одной ячейки. Недоступные и занятые ячейки инертны.
    /// Возвращает `true`, если выбор изменился.
    pub fn toggle_seat(&mut self, row: usize, col: usize) -> bool {
        if !self.is_enabled(row, col) || self.is_booked(row, col) {
            return false;
        }
        let index = GridPos::new(row, col).index(self.cols);
        if !self.selection.remove(&index) {
            self.selection.insert(index);
        }
        true
    }

    pub fn on_pointer_enter_grid(&mut self) {
        self.pointer_inside = true;
    }

    /// Указатель покинул сетку: незавершённое перетаскивание отменяется,
    /// уже выбранное остаётся.
    pub fn on_pointer_leave_grid(&mut self) {
        self.pointer_inside = false;
        self.dragging = false;
    }

    pub fn begin_drag(&mut self, row: usize, col: usize) {
        if !self.pointer_inside {
            return;
        }
        self.dragging = true;
        self.anchor = Some(GridPos::new(row, col));
    }

    /// Пересчитывает прямоугольник от якоря до `(row, col)` и заменяет им выбор.
    /// Возвращает `true`, если выбор был пересчитан.
    pub fn extend_drag(&mut self, row: usize, col: usize) -> bool {
        if !self.dragging || !self.pointer_inside {
            return false;
        }
        let Some(anchor) = self.anchor else {
            return false;
        };
        let region = SelectionRegion::spanning(anchor, GridPos::new(row, col));
        self.selection = region.indices(self.cols).collect();
        true
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.anchor = None;
    }
}
