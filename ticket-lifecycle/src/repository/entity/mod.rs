mod ticket_entity;

pub use ticket_entity::*;
