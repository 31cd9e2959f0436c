pub mod grid;
pub mod selection;

pub use grid::{GridPos, SelectionRegion};
pub use selection::{CellColor, CellState, Palette, SeatSelectionModel};
