use seat_hold::models::{Cell, SeatTier, VenueLayout, STANDARD_TIER_ID};
use seat_hold::seatmap::{CellColor, GridPos, SelectionRegion};
use seat_hold::venue::VenueConfig;

const ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// Зал 5x10, место в строке r и колонке c называется "<буква><c+1>".
fn layout() -> VenueLayout {
    let rows: Vec<Vec<Cell>> = ROWS
        .iter()
        .map(|letter| {
            (1..=10)
                .map(|n| Cell::seat(format!("{letter}{n}")))
                .collect::<Vec<_>>()
        })
        .collect();
    VenueLayout::new(rows).unwrap()
}

fn tier(id: &str, color: &str, rows: (usize, usize)) -> SeatTier {
    SeatTier {
        id: id.to_string(),
        name: id.to_string(),
        price: 100.0,
        color_code: color.to_string(),
        region: Some(SelectionRegion::spanning(
            GridPos::new(rows.0, 0),
            GridPos::new(rows.1, 9),
        )),
    }
}

fn config() -> VenueConfig {
    VenueConfig::new(vec![
        tier("premium", "#f59e0b", (0, 1)),
        tier(STANDARD_TIER_ID, "#10b981", (2, 4)),
    ])
}

#[test]
fn drag_over_premium_rows_selects_twenty_cells() {
    let layout = layout();
    let mut model = config().selection_model(&layout);
    model.mark_booked_seats(&layout, ["C3"]);

    model.on_pointer_enter_grid();
    model.begin_drag(0, 0);
    model.extend_drag(1, 9);
    model.end_drag();

    assert_eq!(model.selection().len(), 20);
    assert_eq!(model.cell_color(0, 0), CellColor::Selected);
    assert_eq!(model.cell_color(2, 0), CellColor::Tier("#10b981"));
    assert_eq!(model.cell_color(2, 2), CellColor::Booked);
}

#[test]
fn booked_seat_stays_booked_under_any_drag() {
    let layout = layout();
    let mut model = config().selection_model(&layout);
    model.mark_booked_seats(&layout, ["C3"]);
    model.on_pointer_enter_grid();

    model.begin_drag(4, 9);
    model.extend_drag(0, 0);
    assert!(model.is_selected(2, 2));
    assert_eq!(model.cell_color(2, 2), CellColor::Booked);

    // Клик по занятому месту ничего не меняет
    let before = model.selection().clone();
    assert!(!model.toggle_seat(2, 2));
    assert_eq!(model.selection(), &before);
}

#[test]
fn assigning_dragged_rows_feeds_ticket_generation() {
    let layout = layout();
    let mut config = config();
    let mut model = config.selection_model(&layout);

    model.on_pointer_enter_grid();
    model.begin_drag(0, 0);
    model.extend_drag(1, 9);
    model.end_drag();

    assert_eq!(config.assign_selection(&layout, &model, "premium").unwrap(), 20);

    let tickets = config.generate_tickets(3, &layout).unwrap();
    assert_eq!(tickets.len(), 50);
    assert_eq!(tickets.iter().filter(|t| t.class == "premium").count(), 20);
    assert_eq!(tickets[20].seat, "C1");
    assert_eq!(tickets[20].class, STANDARD_TIER_ID);
}
