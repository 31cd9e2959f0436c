pub mod ticket;
pub mod venue;

pub use ticket::{IssuedTicket, NewTicket, TicketStatus};
pub use venue::{Cell, SeatTier, VenueLayout, STANDARD_TIER_ID, UNAVAILABLE_TIER_ID};
