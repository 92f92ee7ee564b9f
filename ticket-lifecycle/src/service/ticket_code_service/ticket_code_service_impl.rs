use super::TicketCodeService;
use crate::domain::TicketCode;
use uuid::Uuid;

const CODE_PREFIX: &str = "TKT-";

pub struct TicketCodeServiceImpl;

impl TicketCodeService for TicketCodeServiceImpl {
    fn generate_unique_code(&self) -> TicketCode {
        let random = Uuid::new_v4().simple().to_string().to_uppercase();

        TicketCode::new(format!("{CODE_PREFIX}{random}"))
    }
}
