mod cancellable;
mod consumer_service;
mod dto;

pub mod metrics_service;
pub mod payment_approved_consumer_service;
pub mod payment_confirmed_consumer_service;
pub mod payment_rejected_consumer_service;
pub mod seat_released_consumer_service;
pub mod ticket_code_service;
pub mod ticket_events_producer_service;

pub use dto::ConsumerServiceConfig;

#[cfg(test)]
mod test {
    use crate::domain::{TicketCode, TicketSnapshot, TicketState};
    use rabbitmq_client::consumer::{CancellationSource, Delivery};
    use time::OffsetDateTime;
    use uuid::Uuid;

    pub fn snapshot(state: TicketState) -> TicketSnapshot {
        TicketSnapshot {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            seat_id: Some(Uuid::new_v4()),
            order_id: Uuid::new_v4(),
            amount: 100,
            ticket_code: TicketCode::placeholder(),
            state,
            purchase_date: OffsetDateTime::now_utc(),
            version: 0,
        }
    }

    pub fn delivery(content: Vec<u8>, cancellation_source: &CancellationSource) -> Delivery {
        Delivery {
            delivery_tag: 1,
            redelivered: false,
            content,
            cancellation: cancellation_source.cancellation(),
        }
    }
}
