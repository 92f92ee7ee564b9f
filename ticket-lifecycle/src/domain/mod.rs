//!
//! Ticket aggregate and the state machine that guards its transitions
//!

mod ticket;
mod ticket_code;
mod ticket_state;

pub use ticket::*;
pub use ticket_code::*;
pub use ticket_state::*;
