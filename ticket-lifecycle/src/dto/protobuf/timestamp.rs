use anyhow::anyhow;
use prost_types::Timestamp;
use time::OffsetDateTime;

pub fn timestamp_from_datetime(datetime: OffsetDateTime) -> Timestamp {
    Timestamp {
        seconds: datetime.unix_timestamp(),
        nanos: datetime.nanosecond() as i32,
    }
}

pub fn datetime_from_timestamp(timestamp: Timestamp) -> anyhow::Result<OffsetDateTime> {
    let nanos = i128::from(timestamp.seconds) * 1_000_000_000 + i128::from(timestamp.nanos);

    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|err| anyhow!("invalid timestamp: {err}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn datetime_survives_conversion() {
        let datetime = datetime!(2024-05-17 18:30:12.123456789 UTC);

        let converted = datetime_from_timestamp(timestamp_from_datetime(datetime)).unwrap();

        assert_eq!(converted, datetime);
    }

    #[test]
    fn out_of_range_timestamp_rejected() {
        let timestamp = Timestamp {
            seconds: i64::MAX,
            nanos: 0,
        };

        assert!(datetime_from_timestamp(timestamp).is_err());
    }
}
