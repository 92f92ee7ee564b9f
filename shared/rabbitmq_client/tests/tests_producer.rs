mod common;

use amqprs::{
    channel::{
        BasicGetArguments, ExchangeDeclareArguments, ExchangeType, QueueBindArguments,
        QueueDeclareArguments, QueueDeleteArguments,
    },
    BasicProperties,
};
use common::*;
use rabbitmq_client::producer::{RabbitmqProducer, RabbitmqProducerConfig};
use serial_test::parallel;
use std::{sync::Once, time::Duration};

static BEFORE_ALL: Once = Once::new();

#[tokio::test]
#[parallel]
#[ignore = "requires running RabbitMQ"]
async fn published_message_is_routed_after_confirm() {
    BEFORE_ALL.call_once(init_test_environment);

    const EXCHANGE: &str = "test published_message_is_routed_after_confirm";
    const QUEUE: &str = "test published_message_is_routed_after_confirm";
    const ROUTING_KEY: &str = "ticket.paid";

    let connection = create_connection().await.unwrap();
    let channel = connection.open_channel(None).await.unwrap();
    let args = ExchangeDeclareArguments::of_type(EXCHANGE, ExchangeType::Topic);
    channel.exchange_declare(args).await.unwrap();
    let args = QueueDeclareArguments::new(QUEUE);
    channel.queue_declare(args).await.unwrap();
    let args = QueueBindArguments::new(QUEUE, EXCHANGE, ROUTING_KEY);
    channel.queue_bind(args).await.unwrap();

    let rabbitmq_connection = create_rabbitmq_connection().await;
    let producer = RabbitmqProducer::new(
        &rabbitmq_connection,
        RabbitmqProducerConfig {
            confirm_timeout: Duration::from_secs(5),
        },
        ExchangeDeclareArguments::of_type(EXCHANGE, ExchangeType::Topic),
    )
    .await
    .unwrap();

    let content = b"published_message_is_routed_after_confirm".to_vec();
    producer
        .publish(ROUTING_KEY, BasicProperties::default(), content.clone())
        .await
        .unwrap();

    // publish returned after confirm, so message is already in the queue
    let (_get_ok, _basic_properties, message) = channel
        .basic_get(BasicGetArguments::new(QUEUE))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message, content);

    producer.close().await;
    rabbitmq_connection.close().await;

    channel
        .queue_delete(QueueDeleteArguments::new(QUEUE))
        .await
        .unwrap();
    channel.close().await.unwrap();
    connection.close().await.unwrap();
}
