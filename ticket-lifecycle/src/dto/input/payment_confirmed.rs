use super::parse_uuid;
use crate::dto::protobuf::{datetime_from_timestamp, payment::PaymentConfirmedProtobuf};
use anyhow::anyhow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentConfirmed {
    pub ticket_id: Uuid,
    pub transaction_id: String,
    pub confirmed_amount: i64,
    pub payment_method: String,
    pub payment_date: OffsetDateTime,
}

impl TryFrom<PaymentConfirmedProtobuf> for PaymentConfirmed {
    type Error = anyhow::Error;

    fn try_from(value: PaymentConfirmedProtobuf) -> Result<Self, Self::Error> {
        let payment_date = value
            .payment_date
            .ok_or(anyhow!("invalid payment_date: payment_date cannot be null"))?;

        Ok(Self {
            ticket_id: parse_uuid("ticket_id", &value.ticket_id)?,
            transaction_id: value.transaction_id,
            confirmed_amount: value.confirmed_amount,
            payment_method: value.payment_method,
            payment_date: datetime_from_timestamp(payment_date)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use prost_types::Timestamp;

    fn protobuf() -> PaymentConfirmedProtobuf {
        PaymentConfirmedProtobuf {
            ticket_id: "0b1c6d54-3b1f-4b8a-9f3e-2f5d9a1c7e42".to_string(),
            transaction_id: "tx-81723".to_string(),
            confirmed_amount: 100,
            payment_method: "card".to_string(),
            payment_date: Some(Timestamp {
                seconds: 1_715_970_612,
                nanos: 0,
            }),
        }
    }

    #[test]
    fn valid_message_converted() {
        let message = PaymentConfirmed::try_from(protobuf()).unwrap();

        assert_eq!(
            message.ticket_id.to_string(),
            "0b1c6d54-3b1f-4b8a-9f3e-2f5d9a1c7e42"
        );
        assert_eq!(message.confirmed_amount, 100);
        assert_eq!(message.payment_date.unix_timestamp(), 1_715_970_612);
    }

    #[test]
    fn missing_payment_date_rejected() {
        let message = PaymentConfirmedProtobuf {
            payment_date: None,
            ..protobuf()
        };

        assert!(PaymentConfirmed::try_from(message).is_err());
    }

    #[test]
    fn invalid_ticket_id_rejected() {
        let message = PaymentConfirmedProtobuf {
            ticket_id: "not a uuid".to_string(),
            ..protobuf()
        };

        let err = PaymentConfirmed::try_from(message).unwrap_err();

        assert!(err.to_string().starts_with("invalid ticket_id"));
    }
}
