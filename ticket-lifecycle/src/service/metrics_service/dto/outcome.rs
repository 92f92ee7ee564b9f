///
/// Result of handling a single delivery.
///
/// Label values are shared with dashboards of other services,
/// so they must not be renamed.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// Ticket changed as requested
    Success,

    /// No ticket matches the event
    EntradaNoEncontrada,

    /// Ticket already is in the target state or cannot reach it
    EstadoInvalido,

    /// Event does not concern any ticket that could change
    Ignored,

    /// Handling failed
    Error,
}
