///
/// Inbound event handled by the engine, used as metric label
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    SeatReleased,
    PaymentApproved,
    PaymentConfirmed,
    PaymentRejected,
}
