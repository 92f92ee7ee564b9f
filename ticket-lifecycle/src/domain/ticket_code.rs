use std::fmt;

const PLACEHOLDER_PREFIX: &str = "TEMP-";

///
/// Code presented at the venue entrance.
///
/// Tickets are created with a placeholder code which is replaced
/// by a final one when the payment is confirmed.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCode(String);

impl TicketCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn placeholder() -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
