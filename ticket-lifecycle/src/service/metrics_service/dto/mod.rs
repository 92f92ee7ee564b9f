mod operation;
mod outcome;

pub use operation::Operation;
pub use outcome::Outcome;
