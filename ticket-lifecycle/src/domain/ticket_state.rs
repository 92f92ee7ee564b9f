use strum::{Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TicketState {
    PendingPayment,
    Reserved,
    Paid,
    Cancelled,
    Used,
}

impl TicketState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Used)
    }

    ///
    /// States from which both payment confirmation and cancellation are allowed
    ///
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::PendingPayment | Self::Reserved)
    }
}
