use super::parse_uuid;
use crate::dto::protobuf::seat::SeatReleasedProtobuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SeatReleased {
    pub seat_id: Uuid,
    pub row: String,
    pub number: u32,
}

impl TryFrom<SeatReleasedProtobuf> for SeatReleased {
    type Error = anyhow::Error;

    fn try_from(value: SeatReleasedProtobuf) -> Result<Self, Self::Error> {
        Ok(Self {
            seat_id: parse_uuid("seat_id", &value.seat_id)?,
            row: value.row,
            number: value.number,
        })
    }
}
