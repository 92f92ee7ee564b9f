use crate::{dto::output, error::Error};
use async_trait::async_trait;

///
/// Service used to tell other services about ticket changes
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketEventsProducerService: Send + Sync {
    ///
    /// Publishes Ticket-Paid event.
    /// Returns after the broker took ownership of the message.
    ///
    /// ### Errors
    /// - [Error::Producer] when message could not be published
    ///
    async fn send_ticket_paid(&self, ticket_paid: output::TicketPaid) -> Result<(), Error>;

    ///
    /// Publishes Reservation-Cancelled event.
    /// Returns after the broker took ownership of the message.
    ///
    /// ### Errors
    /// - [Error::Producer] when message could not be published
    ///
    async fn send_reservation_cancelled(
        &self,
        reservation_cancelled: output::ReservationCancelled,
    ) -> Result<(), Error>;
}
