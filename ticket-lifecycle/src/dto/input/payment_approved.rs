use super::parse_uuid;
use crate::dto::protobuf::payment::PaymentApprovedProtobuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentApproved {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub amount: i64,
}

impl TryFrom<PaymentApprovedProtobuf> for PaymentApproved {
    type Error = anyhow::Error;

    fn try_from(value: PaymentApprovedProtobuf) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: parse_uuid("order_id", &value.order_id)?,
            transaction_id: value.transaction_id,
            amount: value.amount,
        })
    }
}
