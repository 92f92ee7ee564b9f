use super::{Operation, Outcome};
use crate::domain::TicketState;
use std::time::Duration;

///
/// Sink for handler metrics.
///
/// Lives as long as the process, created by the composition root
/// and shared by all consumers.
///
#[cfg_attr(test, mockall::automock)]
pub trait MetricsService: Send + Sync {
    ///
    /// Counts handled delivery.
    /// `state` is the ticket state after handling, when a ticket was found.
    ///
    fn record_outcome(&self, operation: Operation, outcome: Outcome, state: Option<TicketState>);

    fn record_duration(&self, operation: Operation, duration: Duration);

    ///
    /// Counts payments whose amount differs from the ticket amount
    ///
    fn record_amount_discrepancy(&self, operation: Operation);
}
