mod reservation_cancelled;
mod ticket_paid;

pub use reservation_cancelled::*;
pub use ticket_paid::*;
