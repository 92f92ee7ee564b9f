use crate::dto::protobuf::ticket::TicketPaidProtobuf;
use uuid::Uuid;

///
/// Published once per event when tickets of the order become paid.
/// `seat_ids` never contains duplicates.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPaid {
    pub order_id: Uuid,
    pub event_id: Uuid,
    pub total_amount: i64,
    pub seat_ids: Vec<Uuid>,
}

impl From<TicketPaid> for TicketPaidProtobuf {
    fn from(value: TicketPaid) -> Self {
        Self {
            order_id: value.order_id.to_string(),
            event_id: value.event_id.to_string(),
            total_amount: value.total_amount,
            seat_ids: value.seat_ids.iter().map(Uuid::to_string).collect(),
        }
    }
}
