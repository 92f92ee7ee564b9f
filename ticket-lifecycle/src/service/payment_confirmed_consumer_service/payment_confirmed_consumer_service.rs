use crate::{
    domain::Transition,
    dto::{input, protobuf::payment::PaymentConfirmedProtobuf},
    error::Error,
    repository::TicketsRepository,
    service::{
        cancellable::cancellable,
        consumer_service::start_consumer,
        metrics_service::{MetricsService, Operation, Outcome},
        ticket_code_service::TicketCodeService,
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

const ROUTING_KEY: &str = "payment.confirmed";
const OPERATION: Operation = Operation::PaymentConfirmed;

///
/// Confirms payment of a single ticket and issues its final code.
///
/// Store failures are never swallowed, the delivery goes back
/// to the queue until the ticket is persisted.
///
pub struct PaymentConfirmedConsumerService {
    rabbitmq_consumer: RabbitmqConsumer,
}

impl PaymentConfirmedConsumerService {
    pub async fn new(
        config: ConsumerServiceConfig,
        rabbitmq_connection: &RabbitmqConnection,
        tickets_repository: Arc<dyn TicketsRepository>,
        ticket_code_service: Arc<dyn TicketCodeService>,
        metrics_service: Arc<dyn MetricsService>,
    ) -> anyhow::Result<Self> {
        let consumer = Consumer {
            tickets_repository,
            ticket_code_service,
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
    metrics_service: Arc<dyn MetricsService>,
}

impl Consumer {
    fn decode(content: &[u8]) -> anyhow::Result<input::PaymentConfirmed> {
        let message = PaymentConfirmedProtobuf::decode(content)
            .map_err(|err| anyhow!("invalid payment confirmed: {err}"))?;

        input::PaymentConfirmed::try_from(message)
    }

    async fn try_consume(
        &self,
        message: input::PaymentConfirmed,
        mut cancellation: DeliveryCancellation,
    ) -> Result<(), Error> {
        let ticket_id = message.ticket_id;

        tracing::info!(
            %ticket_id,
            transaction_id = message.transaction_id,
            confirmed_amount = message.confirmed_amount,
            payment_method = message.payment_method,
            payment_date = %message.payment_date,
            "payment confirmed"
        );

        let ticket = cancellable(&mut cancellation, self.tickets_repository.find(ticket_id)).await?;
        let Some(mut ticket) = ticket else {
            tracing::warn!(%ticket_id, "ticket not found");
            self.metrics_service
                .record_outcome(OPERATION, Outcome::EntradaNoEncontrada, None);
            return Ok(());
        };

        if ticket.amount() != message.confirmed_amount {
            tracing::warn!(
                %ticket_id,
                ticket_amount = ticket.amount(),
                confirmed_amount = message.confirmed_amount,
                "confirmed amount differs from ticket amount"
            );
            self.metrics_service.record_amount_discrepancy(OPERATION);
        }

        let state = ticket.state();
        match ticket.confirm_payment() {
            Ok(Transition::Applied) => {}
            Ok(Transition::AlreadyApplied) => {
                tracing::warn!(%ticket_id, "ticket already confirmed");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::EstadoInvalido, Some(state));
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(%ticket_id, %err, "ticket cannot be confirmed");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::EstadoInvalido, Some(state));
                return Ok(());
            }
        }

        if ticket.finalize_ticket_code(|| self.ticket_code_service.generate_unique_code()) {
            tracing::info!(%ticket_id, "ticket code issued");
        }

        cancellable(&mut cancellation, self.tickets_repository.save(&ticket)).await?;

        tracing::info!(%ticket_id, from = %state, "ticket paid");
        self.metrics_service
            .record_outcome(OPERATION, Outcome::Success, Some(ticket.state()));

        Ok(())
    }
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for Consumer {
    #[tracing::instrument(
        name = "Payment Confirmed Consumer",
        skip_all,
        fields(
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
        )
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        tracing::info!("processing payment confirmed");

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
                tracing::info!("payment confirmed processed");
                Ok(())
            }
            Err(Error::Cancelled) => {
                tracing::warn!("processing cancelled");
                Err(ConsumeError::requeue())
            }
            Err(err) => {
                tracing::error!(%err, "failed to process payment confirmed");
                self.metrics_service
                    .record_outcome(OPERATION, Outcome::Error, None);
                Err(ConsumeError::requeue())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        domain::{Ticket, TicketCode, TicketSnapshot, TicketState},
        repository::{self, MockTicketsRepository},
        service::{
            metrics_service::MockMetricsService,
            test::{delivery, snapshot},
            ticket_code_service::MockTicketCodeService,
        },
    };
    use mockall::predicate::eq;
    use prost_types::Timestamp;
    use rabbitmq_client::consumer::CancellationSource;
    use std::sync::Mutex;
    use time::macros::datetime;
    use uuid::Uuid;

    fn message(ticket_id: Uuid, confirmed_amount: i64) -> input::PaymentConfirmed {
        input::PaymentConfirmed {
            ticket_id,
            transaction_id: "tx-10021".to_string(),
            confirmed_amount,
            payment_method: "card".to_string(),
            payment_date: datetime!(2024-05-17 18:30 UTC),
        }
    }

    fn repository_returning(ticket_id: Uuid, ticket: Option<Ticket>) -> MockTicketsRepository {
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .with(eq(ticket_id))
            .times(1)
            .return_once(move |_| Ok(ticket));

        repository
    }

    fn metrics_expecting(outcome: Outcome, state: Option<TicketState>) -> MockMetricsService {
        let mut metrics_service = MockMetricsService::new();
        metrics_service
            .expect_record_outcome()
            .with(eq(OPERATION), eq(outcome), eq(state))
            .times(1)
            .return_const(());

        metrics_service
    }

    fn code_service(code: &'static str) -> MockTicketCodeService {
        let mut ticket_code_service = MockTicketCodeService::new();
        ticket_code_service
            .expect_generate_unique_code()
            .times(1)
            .returning(move || TicketCode::new(code));

        ticket_code_service
    }

    #[tokio::test]
    async fn try_consume_not_found() {
        let ticket_id = Uuid::new_v4();
        let consumer = Consumer {
            tickets_repository: Arc::new(repository_returning(ticket_id, None)),
            ticket_code_service: Arc::new(MockTicketCodeService::new()),
            metrics_service: Arc::new(metrics_expecting(Outcome::EntradaNoEncontrada, None)),
        };
        let source = CancellationSource::new();

        let result = consumer
            .try_consume(message(ticket_id, 100), source.cancellation())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn try_consume_reserved_ticket_paid_with_final_code() {
        let ticket = Ticket::from(snapshot(TicketState::Reserved));
        let ticket_id = ticket.id();

        let mut repository = repository_returning(ticket_id, Some(ticket));
        repository
            .expect_save()
            .withf(|ticket| {
                ticket.state() == TicketState::Paid
                    && ticket.ticket_code().as_str() == "TKT-7F3A"
                    && ticket.amount() == 100
            })
            .times(1)
            .returning(|_| Ok(()));
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(code_service("TKT-7F3A")),
            metrics_service: Arc::new(metrics_expecting(
                Outcome::Success,
                Some(TicketState::Paid),
            )),
        };
        let source = CancellationSource::new();

        let result = consumer
            .try_consume(message(ticket_id, 100), source.cancellation())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn try_consume_final_code_kept() {
        let ticket = Ticket::from(TicketSnapshot {
            ticket_code: TicketCode::new("TKT-PRESET"),
            ..snapshot(TicketState::PendingPayment)
        });
        let ticket_id = ticket.id();

        let mut repository = repository_returning(ticket_id, Some(ticket));
        repository
            .expect_save()
            .withf(|ticket| ticket.ticket_code().as_str() == "TKT-PRESET")
            .times(1)
            .returning(|_| Ok(()));
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(MockTicketCodeService::new()),
            metrics_service: Arc::new(metrics_expecting(
                Outcome::Success,
                Some(TicketState::Paid),
            )),
        };
        let source = CancellationSource::new();

        let result = consumer
            .try_consume(message(ticket_id, 100), source.cancellation())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn try_consume_amount_discrepancy_does_not_block() {
        let ticket = Ticket::from(snapshot(TicketState::Reserved));
        let ticket_id = ticket.id();

        let mut repository = repository_returning(ticket_id, Some(ticket));
        repository
            .expect_save()
            .withf(|ticket| ticket.state() == TicketState::Paid && ticket.amount() == 100)
            .times(1)
            .returning(|_| Ok(()));
        let mut metrics_service = metrics_expecting(Outcome::Success, Some(TicketState::Paid));
        metrics_service
            .expect_record_amount_discrepancy()
            .with(eq(OPERATION))
            .times(1)
            .return_const(());
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(code_service("TKT-7F3A")),
            metrics_service: Arc::new(metrics_service),
        };
        let source = CancellationSource::new();

        let result = consumer
            .try_consume(message(ticket_id, 120), source.cancellation())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn try_consume_invalid_state_not_saved() {
        for state in [TicketState::Paid, TicketState::Cancelled, TicketState::Used] {
            let ticket = Ticket::from(snapshot(state));
            let ticket_id = ticket.id();

            let consumer = Consumer {
                tickets_repository: Arc::new(repository_returning(ticket_id, Some(ticket))),
                ticket_code_service: Arc::new(MockTicketCodeService::new()),
                metrics_service: Arc::new(metrics_expecting(Outcome::EstadoInvalido, Some(state))),
            };
            let source = CancellationSource::new();

            let result = consumer
                .try_consume(message(ticket_id, 100), source.cancellation())
                .await;

            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn try_consume_same_event_twice() {
        let stored = Arc::new(Mutex::new(Ticket::from(snapshot(TicketState::Reserved))));
        let ticket_id = stored.lock().unwrap().id();

        let mut repository = MockTicketsRepository::new();
        let stored_clone = Arc::clone(&stored);
        repository
            .expect_find()
            .times(2)
            .returning(move |_| Ok(Some(stored_clone.lock().unwrap().clone())));
        let stored_clone = Arc::clone(&stored);
        repository
            .expect_save()
            .times(1)
            .returning(move |ticket| {
                *stored_clone.lock().unwrap() = ticket.clone();
                Ok(())
            });
        let mut metrics_service = MockMetricsService::new();
        metrics_service
            .expect_record_outcome()
            .with(
                eq(OPERATION),
                eq(Outcome::Success),
                eq(Some(TicketState::Paid)),
            )
            .times(1)
            .return_const(());
        metrics_service
            .expect_record_outcome()
            .with(
                eq(OPERATION),
                eq(Outcome::EstadoInvalido),
                eq(Some(TicketState::Paid)),
            )
            .times(1)
            .return_const(());
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(code_service("TKT-ONCE")),
            metrics_service: Arc::new(metrics_service),
        };
        let source = CancellationSource::new();

        let first = consumer
            .try_consume(message(ticket_id, 100), source.cancellation())
            .await;
        let second = consumer
            .try_consume(message(ticket_id, 100), source.cancellation())
            .await;

        assert!(first.is_ok());
        assert!(second.is_ok());
        let stored = stored.lock().unwrap();
        assert_eq!(stored.state(), TicketState::Paid);
        assert_eq!(stored.ticket_code().as_str(), "TKT-ONCE");
    }

    #[tokio::test]
    async fn execute_database_error_requeued() {
        let ticket_id = Uuid::new_v4();

        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .times(1)
            .returning(|_| Err(repository::Error::InvalidDocument("unknown ticket state")));
        let mut metrics_service = metrics_expecting(Outcome::Error, None);
        metrics_service
            .expect_record_duration()
            .times(1)
            .return_const(());
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(MockTicketCodeService::new()),
            metrics_service: Arc::new(metrics_service),
        };
        let source = CancellationSource::new();
        let content = PaymentConfirmedProtobuf {
            ticket_id: ticket_id.to_string(),
            transaction_id: "tx-10021".to_string(),
            confirmed_amount: 100,
            payment_method: "card".to_string(),
            payment_date: Some(Timestamp {
                seconds: 1_715_970_612,
                nanos: 0,
            }),
        }
        .encode_to_vec();

        let result = consumer.execute(delivery(content, &source)).await;

        assert_eq!(result, Err(ConsumeError::requeue()));
    }

    #[tokio::test]
    async fn execute_cancelled_delivery_requeued() {
        let ticket = Ticket::from(snapshot(TicketState::Reserved));
        let ticket_id = ticket.id();

        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .return_once(move |_| Ok(Some(ticket)));
        let mut metrics_service = MockMetricsService::new();
        metrics_service
            .expect_record_duration()
            .times(1)
            .return_const(());
        let consumer = Consumer {
            tickets_repository: Arc::new(repository),
            ticket_code_service: Arc::new(MockTicketCodeService::new()),
            metrics_service: Arc::new(metrics_service),
        };
        let source = CancellationSource::new();
        let delivery = delivery(
            PaymentConfirmedProtobuf {
                ticket_id: ticket_id.to_string(),
                transaction_id: "tx-10021".to_string(),
                confirmed_amount: 100,
                payment_method: "card".to_string(),
                payment_date: Some(Timestamp {
                    seconds: 1_715_970_612,
                    nanos: 0,
                }),
            }
            .encode_to_vec(),
            &source,
        );
        source.cancel();

        let result = consumer.execute(delivery).await;

        assert_eq!(result, Err(ConsumeError::requeue()));
    }

    #[tokio::test]
    async fn execute_missing_payment_date_rejected() {
        let consumer = Consumer {
            tickets_repository: Arc::new(MockTicketsRepository::new()),
            ticket_code_service: Arc::new(MockTicketCodeService::new()),
            metrics_service: Arc::new(metrics_expecting(Outcome::Error, None)),
        };
        let source = CancellationSource::new();
        let content = PaymentConfirmedProtobuf {
            ticket_id: Uuid::new_v4().to_string(),
            transaction_id: "tx-10021".to_string(),
            confirmed_amount: 100,
            payment_method: "card".to_string(),
            payment_date: None,
        }
        .encode_to_vec();

        let result = consumer.execute(delivery(content, &source)).await;

        assert_eq!(result, Err(ConsumeError::reject()));
    }
}
