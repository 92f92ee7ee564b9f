use crate::dto::protobuf::{ticket::ReservationCancelledProtobuf, timestamp_from_datetime};
use time::OffsetDateTime;
use uuid::Uuid;

///
/// Compensating event that lets seat inventory free the seat
/// without waiting for the lease to expire.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationCancelled {
    pub ticket_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub cancelled_at: OffsetDateTime,
}

impl From<ReservationCancelled> for ReservationCancelledProtobuf {
    fn from(value: ReservationCancelled) -> Self {
        Self {
            ticket_id: value.ticket_id.to_string(),
            seat_id: value.seat_id.as_ref().map(Uuid::to_string),
            event_id: value.event_id.to_string(),
            user_id: value.user_id.to_string(),
            cancelled_at: Some(timestamp_from_datetime(value.cancelled_at)),
        }
    }
}
