use crate::domain::TicketCode;

///
/// Issues admission codes for paid tickets
///
#[cfg_attr(test, mockall::automock)]
pub trait TicketCodeService: Send + Sync {
    ///
    /// Generates code that is never a placeholder
    /// and does not collide with codes issued before.
    ///
    fn generate_unique_code(&self) -> TicketCode;
}
