use super::ticket_paid_aggregation::ticket_paid_events;
use crate::{
    domain::{TicketState, Transition},
    dto::{input, protobuf::payment::PaymentApprovedProtobuf},
    error::Error,
    repository::TicketsRepository,
    service::{
        cancellable::cancellable,
        consumer_service::start_consumer,
        metrics_service::{MetricsService, Operation, Outcome},
        ticket_code_service::TicketCodeService,
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

const ROUTING_KEY: &str = "payment.approved";
const OPERATION: Operation = Operation::PaymentApproved;

///
/// Confirms every ticket of the paid order and announces paid seats.
///
/// Tickets are confirmed independently, a ticket that cannot be paid
/// does not stop the others. Infrastructure failures put the delivery
/// back to the queue so the whole order is processed again.
///
pub struct PaymentApprovedConsumerService {
    rabbitmq_consumer: RabbitmqConsumer,
}

impl PaymentApprovedConsumerService {
    pub async fn new(
        config: ConsumerServiceConfig,
        rabbitmq_connection: &RabbitmqConnection,
        tickets_repository: Arc<dyn TicketsRepository>,
        ticket_code_service: Arc<dyn TicketCodeService>,
        ticket_events_producer_service: Arc<dyn TicketEventsProducerService>,
        metrics_service: Arc<dyn MetricsService>,
    ) -> anyhow::Result<Self> {
        let consumer = Consumer {
            tickets_repository,
            ticket_code_service,
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
    ticket_code_service: Arc<dyn TicketCodeService>,
    ticket_events_producer_service: Arc<dyn TicketEventsProducerService>,
    metrics_service: Arc<dyn MetricsService>,
}

impl Consumer {
    fn decode(content: &[u8]) -> anyhow::Result<input::PaymentApproved> {
        let message = PaymentApprovedProtobuf::decode(content)
            .map_err(|err| anyhow!("invalid payment approved: {err}"))?;

        input::PaymentApproved::try_from(message)
    }

    async fn try_consume(
        &self,
        message: input::PaymentApproved,
        mut cancellation: DeliveryCancellation,
    ) -> Result<(), Error> {
        tracing::info!(
            order_id = %message.order_id,
            transaction_id = message.transaction_id,
            amount = message.amount,
            "payment approved"
        );

        let mut tickets = cancellable(
            &mut cancellation,
            self.tickets_repository
                .find_many_by_order(message.order_id),
        )
        .await?;

        if tickets.is_empty() {
            tracing::error!(
                critical = true,
                order_id = %message.order_id,
                transaction_id = message.transaction_id,
                amount = message.amount,
                "payment charged for order without tickets"
            );
            self.metrics_service
                .record_outcome(OPERATION, Outcome::EntradaNoEncontrada, None);
            return Ok(());
        }

        let tickets_amount = tickets.iter().map(|ticket| ticket.amount()).sum::<i64>();
        if tickets_amount != message.amount {
            tracing::warn!(
                tickets_amount,
                payment_amount = message.amount,
                "payment amount differs from tickets amount"
            );
            self.metrics_service.record_amount_discrepancy(OPERATION);
        }

        let mut newly_confirmed = 0;
        let mut already_confirmed = 0;
        for ticket in tickets.iter_mut() {
            let ticket_id = ticket.id();
            let state = ticket.state();
            if state.is_terminal() {
                tracing::warn!(%ticket_id, %state, "unexpected ticket state");
            }

            match ticket.confirm_payment() {
                Ok(Transition::Applied) => {
                    ticket.finalize_ticket_code(|| self.ticket_code_service.generate_unique_code());
                    newly_confirmed += 1;
                }
                Ok(Transition::AlreadyApplied) => {
                    tracing::info!(%ticket_id, "ticket already confirmed");
                    already_confirmed += 1;
                }
                Err(err) => {
                    tracing::warn!(%ticket_id, %err, "skipping ticket");
                }
            }
        }

        tracing::info!(newly_confirmed, already_confirmed, "tickets confirmed");

        let paid_tickets = tickets
            .into_iter()
            .filter(|ticket| ticket.state() == TicketState::Paid)
            .collect::<Vec<_>>();

        if paid_tickets.is_empty() {
            tracing::warn!("no ticket of the order could be paid");
            self.metrics_service
                .record_outcome(OPERATION, Outcome::EstadoInvalido, None);
            return Ok(());
        }

        cancellable(
            &mut cancellation,
            self.tickets_repository.save_many(&paid_tickets),
        )
        .await?;

        for ticket_paid in ticket_paid_events(message.order_id, message.amount, &paid_tickets) {
            cancellable(
                &mut cancellation,
                self.ticket_events_producer_service
                    .send_ticket_paid(ticket_paid),
            )
            .await?;
        }

        let outcome = match newly_confirmed > 0 {
            true => Outcome::Success,
            false => Outcome::EstadoInvalido,
        };
        self.metrics_service
            .record_outcome(OPERATION, outcome, Some(TicketState::Paid));

        Ok(())
    }
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for Consumer {
    #[tracing::instrument(
        name = "Payment Approved Consumer",
        skip_all,
        fields(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
        )
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        tracing::info!("processing payment approved");

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
                tracing::info!("payment approved processed");
                Ok(())
            }
            Err(Error::Cancelled) => {
                tracing::warn!("processing cancelled");
                Err(ConsumeError::requeue())
            }
            Err(err) => {
                tracing::error!(%err, "failed to process payment approved");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Error, None);
                Err(ConsumeError::requeue())
            }
        }
    }
}
