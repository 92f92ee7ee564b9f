use crate::{
    domain::{TicketCode, TicketSnapshot, TicketState},
    repository::Error,
};
use bson::{DateTime, Uuid};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Serialize, Deserialize)]
pub struct TicketEntity {
    pub _id: Uuid,

    pub event_id: Uuid,
    pub user_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub order_id: Uuid,

    pub amount: i64,
    pub ticket_code: String,
    pub state: String,
    pub purchase_date: DateTime,

    pub version: i64,
}

impl TryFrom<TicketEntity> for TicketSnapshot {
    type Error = Error;

    fn try_from(value: TicketEntity) -> Result<Self, Self::Error> {
        let state = TicketState::from_str(&value.state)
            .map_err(|_| Error::InvalidDocument("unknown ticket state"))?;

        Ok(Self {
            id: value._id.into(),
            event_id: value.event_id.into(),
            user_id: value.user_id.into(),
            seat_id: value.seat_id.map(uuid::Uuid::from),
            order_id: value.order_id.into(),
            amount: value.amount,
            ticket_code: TicketCode::new(value.ticket_code),
            state,
            purchase_date: value.purchase_date.into(),
            version: value.version,
        })
    }
}
