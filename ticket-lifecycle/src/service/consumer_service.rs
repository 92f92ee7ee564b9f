use super::dto::ConsumerServiceConfig;
use amqprs::channel::{
    BasicConsumeArguments, ExchangeDeclareArguments, ExchangeType, QueueBindArguments,
    QueueDeclareArguments,
};
use rabbitmq_client::{
    connection::RabbitmqConnection,
    consumer::{RabbitmqConsumer, RabbitmqConsumerConfig, RabbitmqConsumerDeliveryCallback},
};

///
/// Starts consuming events published with `routing_key`
/// on the durable topic exchange.
///
/// Queue is durable and shared by every instance of the service,
/// so the broker spreads deliveries between them.
///
pub async fn start_consumer<DeliveryCallback>(
    config: ConsumerServiceConfig,
    routing_key: &str,
    rabbitmq_connection: &RabbitmqConnection,
    delivery_callback: DeliveryCallback,
) -> anyhow::Result<RabbitmqConsumer>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
{
    let exchange_declare_args =
        ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
            .durable(true)
            .finish();
    let queue_declare_args = QueueDeclareArguments::new(&config.queue)
        .durable(true)
        .finish();
    let queue_bind_args = QueueBindArguments::new(&config.queue, &config.exchange, routing_key);
    let basic_consume_args = BasicConsumeArguments::new(&config.queue, "")
        .manual_ack(true)
        .finish();
    let consumer_config = RabbitmqConsumerConfig {
        prefetch_count: config.prefetch_count,
    };

    RabbitmqConsumer::new(
        rabbitmq_connection,
        consumer_config,
        exchange_declare_args,
        queue_declare_args,
        vec![queue_bind_args],
        basic_consume_args,
        delivery_callback,
    )
    .await
}
