use super::ApplicationEnv;
use crate::{
    repository::TicketsRepositoryImpl,
    service::{
        metrics_service::MetricsServiceImpl,
        payment_approved_consumer_service::PaymentApprovedConsumerService,
        payment_confirmed_consumer_service::PaymentConfirmedConsumerService,
        payment_rejected_consumer_service::PaymentRejectedConsumerService,
        seat_released_consumer_service::SeatReleasedConsumerService,
        ticket_code_service::TicketCodeServiceImpl,
        ticket_events_producer_service::{
            TicketEventsProducerServiceConfig, TicketEventsProducerServiceImpl,
        },
        ConsumerServiceConfig,
    },
};
use amqprs::connection::OpenConnectionArguments;
use mongodb::{options::ClientOptions, Client};
use rabbitmq_client::connection::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::sync::Arc;

pub struct ApplicationState {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub ticket_events_producer_service: Arc<TicketEventsProducerServiceImpl>,
    pub seat_released_consumer_service: SeatReleasedConsumerService,
    pub payment_approved_consumer_service: PaymentApprovedConsumerService,
    pub payment_confirmed_consumer_service: PaymentConfirmedConsumerService,
    pub payment_rejected_consumer_service: PaymentRejectedConsumerService,
}

impl ApplicationState {
    ///
    /// Completes when any consumer was cancelled by the server
    ///
    pub async fn consumer_cancelled(&self) {
        tokio::select! {
            _ = self.seat_released_consumer_service.cancelled_by_server() => {},
            _ = self.payment_approved_consumer_service.cancelled_by_server() => {},
            _ = self.payment_confirmed_consumer_service.cancelled_by_server() => {},
            _ = self.payment_rejected_consumer_service.cancelled_by_server() => {},
        }

        tracing::error!("consumer cancelled by server");
    }
}

pub async fn create_state(env: &ApplicationEnv) -> anyhow::Result<ApplicationState> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let tickets_repository = TicketsRepositoryImpl::new(db).await?;
    let tickets_repository = Arc::new(tickets_repository);

    tracing::info!("creating services");
    let ticket_code_service = Arc::new(TicketCodeServiceImpl);
    let metrics_service = Arc::new(MetricsServiceImpl);

    let config = RabbitmqConnectionConfig {
        retry_interval: env.rabbitmq_retry_interval,
        max_open_attempts: env.rabbitmq_max_open_attempts,
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(env.rabbitmq_connection_string.as_str())?;
    let rabbitmq_connection = RabbitmqConnection::new(config, open_connection_args).await?;

    let config = TicketEventsProducerServiceConfig {
        exchange: env.rabbitmq_tickets_exchange_name.clone(),
        confirm_timeout: env.rabbitmq_confirm_timeout,
    };
    let ticket_events_producer_service =
        TicketEventsProducerServiceImpl::new(config, &rabbitmq_connection).await?;
    let ticket_events_producer_service = Arc::new(ticket_events_producer_service);

    tracing::info!("starting consumers");
    let config = ConsumerServiceConfig {
        exchange: env.rabbitmq_seats_exchange_name.clone(),
        queue: env.rabbitmq_seat_released_queue_name.clone(),
        prefetch_count: env.rabbitmq_prefetch_count,
    };
    let seat_released_consumer_service = SeatReleasedConsumerService::new(
        config,
        &rabbitmq_connection,
        tickets_repository.clone(),
        metrics_service.clone(),
    )
    .await?;

    let config = ConsumerServiceConfig {
        exchange: env.rabbitmq_payments_exchange_name.clone(),
        queue: env.rabbitmq_payment_approved_queue_name.clone(),
        prefetch_count: env.rabbitmq_prefetch_count,
    };
    let payment_approved_consumer_service = PaymentApprovedConsumerService::new(
        config,
        &rabbitmq_connection,
        tickets_repository.clone(),
        ticket_code_service.clone(),
        ticket_events_producer_service.clone(),
        metrics_service.clone(),
    )
    .await?;

    let config = ConsumerServiceConfig {
        exchange: env.rabbitmq_payments_exchange_name.clone(),
        queue: env.rabbitmq_payment_confirmed_queue_name.clone(),
        prefetch_count: env.rabbitmq_prefetch_count,
    };
    let payment_confirmed_consumer_service = PaymentConfirmedConsumerService::new(
        config,
        &rabbitmq_connection,
        tickets_repository.clone(),
        ticket_code_service,
        metrics_service.clone(),
    )
    .await?;

    let config = ConsumerServiceConfig {
        exchange: env.rabbitmq_payments_exchange_name.clone(),
        queue: env.rabbitmq_payment_rejected_queue_name.clone(),
        prefetch_count: env.rabbitmq_prefetch_count,
    };
    let payment_rejected_consumer_service = PaymentRejectedConsumerService::new(
        config,
        &rabbitmq_connection,
        tickets_repository,
        ticket_events_producer_service.clone(),
        metrics_service,
    )
    .await?;

    Ok(ApplicationState {
        db_client,
        rabbitmq_connection,
        ticket_events_producer_service,
        seat_released_consumer_service,
        payment_approved_consumer_service,
        payment_confirmed_consumer_service,
        payment_rejected_consumer_service,
    })
}
