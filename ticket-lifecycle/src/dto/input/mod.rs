mod payment_approved;
mod payment_confirmed;
mod payment_rejected;
mod seat_released;

pub use payment_approved::*;
pub use payment_confirmed::*;
pub use payment_rejected::*;
pub use seat_released::*;

use anyhow::anyhow;
use std::str::FromStr;
use uuid::Uuid;

fn parse_uuid(field: &'static str, value: &str) -> anyhow::Result<Uuid> {
    Uuid::from_str(value).map_err(|err| anyhow!("invalid {field}: {err}"))
}
