use super::error::Error;
use crate::domain::Ticket;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketsRepository: Send + Sync {
    ///
    /// Finds ticket by its id
    ///
    async fn find(&self, id: Uuid) -> Result<Option<Ticket>, Error>;

    ///
    /// Finds all tickets purchased within the order.
    /// Tickets are sorted ascending by purchase date.
    ///
    async fn find_many_by_order(&self, order_id: Uuid) -> Result<Vec<Ticket>, Error>;

    ///
    /// Finds the newest ticket bound to the seat that was not cancelled
    ///
    async fn find_active_by_seat(&self, seat_id: Uuid) -> Result<Option<Ticket>, Error>;

    ///
    /// Persists ticket state and code.
    ///
    /// ### Errors
    /// - [Error::VersionConflict] when ticket does not exist
    ///   or was saved by someone else since it was read
    ///
    async fn save(&self, ticket: &Ticket) -> Result<(), Error>;

    ///
    /// Persists every ticket like [Self::save]. Stops at the first error.
    ///
    async fn save_many(&self, tickets: &[Ticket]) -> Result<(), Error>;
}
