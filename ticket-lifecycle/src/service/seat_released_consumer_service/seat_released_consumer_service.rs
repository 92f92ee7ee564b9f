use crate::{
    domain::Transition,
    dto::{input, protobuf::seat::SeatReleasedProtobuf},
    error::Error,
    repository::TicketsRepository,
    service::{
        cancellable::cancellable,
        consumer_service::start_consumer,
        metrics_service::{MetricsService, Operation, Outcome},
        ConsumerServiceConfig,
    },
};
use anyhow::anyhow;
use async_trait::async_trait;
use prost::Message;
use rabbitmq_client::{
    connection::RabbitmqConnection,
    consumer::{
        ConsumeError, Delivery, DeliveryCancellation, RabbitmqConsumer,
        RabbitmqConsumerDeliveryCallback,
    },
};
use std::{sync::Arc, time::Instant};

const ROUTING_KEY: &str = "seat.released";
const OPERATION: Operation = Operation::SeatReleased;

///
/// Cancels tickets whose seat lease was released before payment.
///
/// Failures are logged and the delivery is acknowledged anyway,
/// only cancelled deliveries go back to the queue.
///
pub struct SeatReleasedConsumerService {
    rabbitmq_consumer: RabbitmqConsumer,
}

impl SeatReleasedConsumerService {
    pub async fn new(
        config: ConsumerServiceConfig,
        rabbitmq_connection: &RabbitmqConnection,
        tickets_repository: Arc<dyn TicketsRepository>,
        metrics_service: Arc<dyn MetricsService>,
    ) -> anyhow::Result<Self> {
        let consumer = Consumer {
            tickets_repository,
            metrics_service,
        };
        let rabbitmq_consumer =
            start_consumer(config, ROUTING_KEY, rabbitmq_connection, consumer).await?;

        Ok(Self { rabbitmq_consumer })
    }

    pub async fn cancelled_by_server(&self) {
        self.rabbitmq_consumer.cancelled_by_server().await;
    }

    pub async fn close(self) {
        self.rabbitmq_consumer.close().await;
    }
}

struct Consumer {
    tickets_repository: Arc<dyn TicketsRepository>,
    metrics_service: Arc<dyn MetricsService>,
}

impl Consumer {
    fn decode(content: &[u8]) -> anyhow::Result<input::SeatReleased> {
        let message = SeatReleasedProtobuf::decode(content)
            .map_err(|err| anyhow!("invalid seat released: {err}"))?;

        input::SeatReleased::try_from(message)
    }

    async fn try_consume(
        &self,
        message: input::SeatReleased,
        mut cancellation: DeliveryCancellation,
    ) -> Result<(), Error> {
        tracing::info!(
            seat_id = %message.seat_id,
            row = message.row,
            number = message.number,
            "seat released"
        );

        let ticket = cancellable(
            &mut cancellation,
            self.tickets_repository
                .find_active_by_seat(message.seat_id),
        )
        .await?;

        let Some(mut ticket) = ticket else {
            tracing::info!("no active ticket bound to the seat");
            self.metrics_service
                .record_outcome(OPERATION, Outcome::Ignored, None);
            return Ok(());
        };

        let ticket_id = ticket.id();
        let state = ticket.state();
        match ticket.cancel() {
            Ok(Transition::Applied) => {
                cancellable(&mut cancellation, self.tickets_repository.save(&ticket)).await?;

                tracing::info!(
                    %ticket_id,
                    order_id = %ticket.order_id(),
                    purchase_date = %ticket.purchase_date(),
                    from = %state,
                    "ticket cancelled"
                );
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Success, Some(ticket.state()));
            }
            Ok(Transition::AlreadyApplied) => {
                tracing::info!(%ticket_id, "ticket already cancelled");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Ignored, Some(state));
            }
            Err(err) => {
                tracing::info!(%ticket_id, %err, "ticket kept");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::EstadoInvalido, Some(state));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for Consumer {
    #[tracing::instrument(
        name = "Seat Released Consumer",
        skip_all,
        fields(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
        )
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        tracing::info!("processing seat released");

        let message = match Self::decode(&delivery.content) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%err, "rejecting malformed message");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Error, None);
                return Err(ConsumeError::reject());
            }
        };

        let started_at = Instant::now();
        let result = self.try_consume(message, delivery.cancellation).await;
        self.metrics_service
            .record_duration(OPERATION, started_at.elapsed());

        match result {
            Ok(()) => {
                tracing::info!("seat released processed");
                Ok(())
            }
            Err(Error::Cancelled) => {
                tracing::warn!("processing cancelled");
                Err(ConsumeError::requeue())
            }
            Err(err) => {
                tracing::error!(%err, "failed to process seat released");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Error, None);
                Ok(())
            }
        }
    }
}
