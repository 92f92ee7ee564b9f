use super::{TicketEventsProducerService, TicketEventsProducerServiceConfig};
use crate::{
    dto::{output, protobuf::ticket},
    error::Error,
};
use amqprs::{
    channel::{ExchangeDeclareArguments, ExchangeType},
    BasicProperties,
};
use async_trait::async_trait;
use prost::Message;
use rabbitmq_client::{
    connection::RabbitmqConnection,
    producer::{RabbitmqProducer, RabbitmqProducerConfig},
};

const ROUTING_KEY_TICKET_PAID: &str = "ticket.paid";
const ROUTING_KEY_RESERVATION_CANCELLED: &str = "reservation.cancelled";

pub struct TicketEventsProducerServiceImpl {
    producer: RabbitmqProducer,
}

impl TicketEventsProducerServiceImpl {
    pub async fn new(
        config: TicketEventsProducerServiceConfig,
        rabbitmq_connection: &RabbitmqConnection,
    ) -> anyhow::Result<Self> {
        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();
        let producer_config = RabbitmqProducerConfig {
            confirm_timeout: config.confirm_timeout,
        };
        let producer =
            RabbitmqProducer::new(rabbitmq_connection, producer_config, exchange_declare_args)
                .await?;

        Ok(Self { producer })
    }

    pub async fn close(self) {
        self.producer.close().await;
    }

    async fn send(&self, routing_key: &'static str, encoded_message: Vec<u8>) -> Result<(), Error> {
        let basic_properties = BasicProperties::default()
            .with_persistence(true)
            .with_content_type("application/x-protobuf")
            .finish();

        self.producer
            .publish(routing_key, basic_properties, encoded_message)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TicketEventsProducerService for TicketEventsProducerServiceImpl {
    async fn send_ticket_paid(&self, ticket_paid: output::TicketPaid) -> Result<(), Error> {
        tracing::info!(
            order_id = %ticket_paid.order_id,
            event_id = %ticket_paid.event_id,
            total_amount = ticket_paid.total_amount,
            seats = ticket_paid.seat_ids.len(),
            "producing Ticket-Paid"
        );

        let message = ticket::TicketPaidProtobuf::from(ticket_paid);
        self.send(ROUTING_KEY_TICKET_PAID, message.encode_to_vec())
            .await
    }

    async fn send_reservation_cancelled(
        &self,
        reservation_cancelled: output::ReservationCancelled,
    ) -> Result<(), Error> {
        tracing::info!(
            ticket_id = %reservation_cancelled.ticket_id,
            seat_id = ?reservation_cancelled.seat_id,
            "producing Reservation-Cancelled"
        );

        let message = ticket::ReservationCancelledProtobuf::from(reservation_cancelled);
        self.send(ROUTING_KEY_RESERVATION_CANCELLED, message.encode_to_vec())
            .await
    }
}
