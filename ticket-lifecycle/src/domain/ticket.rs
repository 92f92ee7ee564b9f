use super::{TicketCode, TicketState};
use time::OffsetDateTime;
use uuid::Uuid;

///
/// Result of a transition that did not violate the state machine
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed
    Applied,

    /// Ticket already was in the target state, nothing changed
    AlreadyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: TicketState,
    pub to: TicketState,
}

///
/// Persisted shape of the ticket used to rehydrate the aggregate
///
#[derive(Debug, Clone)]
pub struct TicketSnapshot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub order_id: Uuid,
    pub amount: i64,
    pub ticket_code: TicketCode,
    pub state: TicketState,
    pub purchase_date: OffsetDateTime,
    pub version: i64,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    seat_id: Option<Uuid>,
    order_id: Uuid,

    /// Minor currency units
    amount: i64,

    ticket_code: TicketCode,
    state: TicketState,
    purchase_date: OffsetDateTime,

    /// Optimistic concurrency token, checked and incremented on every save
    version: i64,
}

impl Ticket {
    ///
    /// Creates ticket waiting for payment with a placeholder code.
    /// Tickets are created by the reservation flow, here only tests need it.
    ///
    #[cfg(test)]
    pub fn create(
        event_id: Uuid,
        user_id: Uuid,
        seat_id: Option<Uuid>,
        order_id: Uuid,
        amount: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            seat_id,
            order_id,
            amount,
            ticket_code: TicketCode::placeholder(),
            state: TicketState::PendingPayment,
            purchase_date: OffsetDateTime::now_utc(),
            version: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn seat_id(&self) -> Option<Uuid> {
        self.seat_id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn ticket_code(&self) -> &TicketCode {
        &self.ticket_code
    }

    pub fn state(&self) -> TicketState {
        self.state
    }

    pub fn purchase_date(&self) -> OffsetDateTime {
        self.purchase_date
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    ///
    /// `PendingPayment | Reserved -> Paid`
    ///
    /// ### Errors
    /// - [InvalidTransition] when ticket is `Cancelled` or `Used`
    ///
    pub fn confirm_payment(&mut self) -> Result<Transition, InvalidTransition> {
        self.transition(TicketState::Paid)
    }

    ///
    /// `PendingPayment | Reserved -> Cancelled`
    ///
    /// ### Errors
    /// - [InvalidTransition] when ticket is `Paid` or `Used`
    ///
    pub fn cancel(&mut self) -> Result<Transition, InvalidTransition> {
        self.transition(TicketState::Cancelled)
    }

    pub fn assign_ticket_code(&mut self, ticket_code: TicketCode) {
        self.ticket_code = ticket_code;
    }

    ///
    /// Replaces placeholder code with the generated one.
    /// Final codes are kept untouched.
    ///
    /// Returns true when the code changed.
    ///
    pub fn finalize_ticket_code(&mut self, generate: impl FnOnce() -> TicketCode) -> bool {
        if !self.ticket_code.is_placeholder() {
            return false;
        }

        self.assign_ticket_code(generate());
        true
    }

    fn transition(&mut self, to: TicketState) -> Result<Transition, InvalidTransition> {
        if self.state == to {
            return Ok(Transition::AlreadyApplied);
        }

        if !self.state.is_cancellable() {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }

        self.state = to;
        Ok(Transition::Applied)
    }
}

impl From<TicketSnapshot> for Ticket {
    fn from(value: TicketSnapshot) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            user_id: value.user_id,
            seat_id: value.seat_id,
            order_id: value.order_id,
            amount: value.amount,
            ticket_code: value.ticket_code,
            state: value.state,
            purchase_date: value.purchase_date,
            version: value.version,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ticket_in(state: TicketState) -> Ticket {
        Ticket::from(TicketSnapshot {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            seat_id: Some(Uuid::new_v4()),
            order_id: Uuid::new_v4(),
            amount: 100,
            ticket_code: TicketCode::placeholder(),
            state,
            purchase_date: OffsetDateTime::now_utc(),
            version: 3,
        })
    }

    #[test]
    fn create_starts_pending_with_placeholder() {
        let ticket = Ticket::create(Uuid::new_v4(), Uuid::new_v4(), None, Uuid::new_v4(), 2500);

        assert_eq!(ticket.state(), TicketState::PendingPayment);
        assert!(ticket.ticket_code().is_placeholder());
        assert_eq!(ticket.version(), 0);
    }

    #[test]
    fn confirm_payment_from_pending_and_reserved() {
        for state in [TicketState::PendingPayment, TicketState::Reserved] {
            let mut ticket = ticket_in(state);

            assert_eq!(ticket.confirm_payment(), Ok(Transition::Applied));
            assert_eq!(ticket.state(), TicketState::Paid);
        }
    }

    #[test]
    fn confirm_payment_twice_is_already_applied() {
        let mut ticket = ticket_in(TicketState::Paid);
        let code = ticket.ticket_code().clone();

        assert_eq!(ticket.confirm_payment(), Ok(Transition::AlreadyApplied));
        assert_eq!(ticket.state(), TicketState::Paid);
        assert_eq!(ticket.ticket_code(), &code);
        assert_eq!(ticket.amount(), 100);
    }

    #[test]
    fn confirm_payment_rejected_from_terminal_states() {
        for state in [TicketState::Cancelled, TicketState::Used] {
            let mut ticket = ticket_in(state);

            assert_eq!(
                ticket.confirm_payment(),
                Err(InvalidTransition {
                    from: state,
                    to: TicketState::Paid,
                })
            );
            assert_eq!(ticket.state(), state);
        }
    }

    #[test]
    fn cancel_from_pending_and_reserved() {
        for state in [TicketState::PendingPayment, TicketState::Reserved] {
            let mut ticket = ticket_in(state);

            assert_eq!(ticket.cancel(), Ok(Transition::Applied));
            assert_eq!(ticket.state(), TicketState::Cancelled);
        }
    }

    #[test]
    fn cancel_cancelled_is_already_applied() {
        let mut ticket = ticket_in(TicketState::Cancelled);

        assert_eq!(ticket.cancel(), Ok(Transition::AlreadyApplied));
    }

    #[test]
    fn cancel_rejected_from_paid_and_used() {
        for state in [TicketState::Paid, TicketState::Used] {
            let mut ticket = ticket_in(state);

            assert!(ticket.cancel().is_err());
            assert_eq!(ticket.state(), state);
        }
    }

    #[test]
    fn finalize_replaces_only_placeholder() {
        let mut ticket = ticket_in(TicketState::Paid);

        assert!(ticket.finalize_ticket_code(|| TicketCode::new("TKT-FIRST")));
        assert_eq!(ticket.ticket_code().as_str(), "TKT-FIRST");

        assert!(!ticket.finalize_ticket_code(|| TicketCode::new("TKT-SECOND")));
        assert_eq!(ticket.ticket_code().as_str(), "TKT-FIRST");
    }
}
