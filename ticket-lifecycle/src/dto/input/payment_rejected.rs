use super::parse_uuid;
use crate::dto::protobuf::payment::PaymentRejectedProtobuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentRejected {
    /// Ticket id, or order id when the payment covered the whole order
    pub id: Uuid,
    pub reason: String,
}

impl TryFrom<PaymentRejectedProtobuf> for PaymentRejected {
    type Error = anyhow::Error;

    fn try_from(value: PaymentRejectedProtobuf) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid("id", &value.id)?,
            reason: value.reason,
        })
    }
}
