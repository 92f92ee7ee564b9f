use crate::{
    domain::{Ticket, TicketState, Transition},
    dto::{input, output, protobuf::payment::PaymentRejectedProtobuf},
    error::Error,
    repository::TicketsRepository,
    service::{
        cancellable::cancellable,
        consumer_service::start_consumer,
        metrics_service::{MetricsService, Operation, Outcome},
        ticket_events_producer_service::TicketEventsProducerService,
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
use time::OffsetDateTime;
use uuid::Uuid;

const ROUTING_KEY: &str = "payment.rejected";
const OPERATION: Operation = Operation::PaymentRejected;

///
/// Cancels reservations whose payment was rejected and tells
/// seat inventory to free the seats right away.
///
/// Failures are logged and the delivery is acknowledged anyway,
/// only cancelled deliveries go back to the queue.
///
pub struct PaymentRejectedConsumerService {
    rabbitmq_consumer: RabbitmqConsumer,
}

impl PaymentRejectedConsumerService {
    pub async fn new(
        config: ConsumerServiceConfig,
        rabbitmq_connection: &RabbitmqConnection,
        tickets_repository: Arc<dyn TicketsRepository>,
        ticket_events_producer_service: Arc<dyn TicketEventsProducerService>,
        metrics_service: Arc<dyn MetricsService>,
    ) -> anyhow::Result<Self> {
        let consumer = Consumer {
            tickets_repository,
            ticket_events_producer_service,
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
    ticket_events_producer_service: Arc<dyn TicketEventsProducerService>,
    metrics_service: Arc<dyn MetricsService>,
}

impl Consumer {
    fn decode(content: &[u8]) -> anyhow::Result<input::PaymentRejected> {
        let message = PaymentRejectedProtobuf::decode(content)
            .map_err(|err| anyhow!("invalid payment rejected: {err}"))?;

        input::PaymentRejected::try_from(message)
    }

    ///
    /// Id is looked up as ticket id first, then as order id
    ///
    async fn find_tickets(
        &self,
        id: Uuid,
        cancellation: &mut DeliveryCancellation,
    ) -> Result<Vec<Ticket>, Error> {
        if let Some(ticket) = cancellable(cancellation, self.tickets_repository.find(id)).await? {
            return Ok(vec![ticket]);
        }

        cancellable(cancellation, self.tickets_repository.find_many_by_order(id)).await
    }

    ///
    /// Returns `false` when ticket is kept in its current state
    ///
    async fn cancel_ticket(
        &self,
        mut ticket: Ticket,
        cancellation: &mut DeliveryCancellation,
    ) -> Result<bool, Error> {
        let ticket_id = ticket.id();
        let state = ticket.state();

        match ticket.cancel() {
            Ok(Transition::Applied) => {}
            Ok(Transition::AlreadyApplied) => {
                tracing::info!(%ticket_id, "ticket already cancelled");
                return Ok(false);
            }
            Err(err) => {
                tracing::info!(%ticket_id, %err, "ticket kept");
                return Ok(false);
            }
        }

        cancellable(cancellation, self.tickets_repository.save(&ticket)).await?;
        tracing::info!(%ticket_id, from = %state, "ticket cancelled");

        let reservation_cancelled = output::ReservationCancelled {
            ticket_id,
            seat_id: ticket.seat_id(),
            event_id: ticket.event_id(),
            user_id: ticket.user_id(),
            cancelled_at: OffsetDateTime::now_utc(),
        };
        cancellable(
            cancellation,
            self.ticket_events_producer_service
                .send_reservation_cancelled(reservation_cancelled),
        )
        .await?;

        Ok(true)
    }

    ///
    /// Every ticket is handled on its own, failure of one ticket
    /// doesn't stop cancellation of the rest of the order
    ///
    async fn try_consume(
        &self,
        message: input::PaymentRejected,
        mut cancellation: DeliveryCancellation,
    ) -> Result<(), Error> {
        tracing::info!(id = %message.id, reason = message.reason, "payment rejected");

        let tickets = self.find_tickets(message.id, &mut cancellation).await?;
        if tickets.is_empty() {
            tracing::warn!(id = %message.id, "no ticket matches rejected payment");
            self.metrics_service
                .record_outcome(OPERATION, Outcome::EntradaNoEncontrada, None);
            return Ok(());
        }

        let mut cancelled = 0;
        let mut failed = 0;
        let mut last_state = None;
        for ticket in tickets {
            let ticket_id = ticket.id();
            last_state = Some(ticket.state());

            match self.cancel_ticket(ticket, &mut cancellation).await {
                Ok(true) => cancelled += 1,
                Ok(false) => {}
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    tracing::error!(%ticket_id, %err, "failed to cancel ticket");
                    self.metrics_service
                        .record_outcome(OPERATION, Outcome::Error, None);
                    failed += 1;
                }
            }
        }

        if cancelled > 0 {
            self.metrics_service.record_outcome(
                OPERATION,
                Outcome::Success,
                Some(TicketState::Cancelled),
            );
        } else if failed == 0 {
            self.metrics_service
                .record_outcome(OPERATION, Outcome::EstadoInvalido, last_state);
        }

        Ok(())
    }
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for Consumer {
    #[tracing::instrument(
        name = "Payment Rejected Consumer",
        skip_all,
        fields(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
        )
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        tracing::info!("processing payment rejected");

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
                tracing::info!("payment rejected processed");
                Ok(())
            }
            Err(Error::Cancelled) => {
                tracing::warn!("processing cancelled");
                Err(ConsumeError::requeue())
            }
            Err(err) => {
                tracing::error!(%err, "failed to process payment rejected");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Error, None);
                Ok(())
            }
        }
    }
}
