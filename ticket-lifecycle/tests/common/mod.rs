use amqprs::{
    channel::{BasicPublishArguments, Channel},
    connection::{Connection, OpenConnectionArguments},
    BasicProperties,
};
use bson::{doc, DateTime, Document};
use mongodb::{Client, Collection};
use std::sync::Once;
use uuid::Uuid;

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

pub fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("environment variable {name} not set"))
}

pub async fn tickets_collection() -> Collection<Document> {
    let client = Client::with_uri_str(env_var("TICKET_LIFECYCLE_DB_CONNECTION_STRING"))
        .await
        .unwrap();

    client
        .database(&env_var("TICKET_LIFECYCLE_DB_NAME"))
        .collection("tickets")
}

pub struct TestTicket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub seat_id: Uuid,
}

pub async fn insert_ticket(collection: &Collection<Document>, state: &str) -> TestTicket {
    let ticket = TestTicket {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        seat_id: Uuid::new_v4(),
    };

    collection
        .insert_one(doc! {
            "_id": bson::Uuid::from(ticket.id),
            "event_id": bson::Uuid::from(Uuid::new_v4()),
            "user_id": bson::Uuid::from(Uuid::new_v4()),
            "seat_id": bson::Uuid::from(ticket.seat_id),
            "order_id": bson::Uuid::from(ticket.order_id),
            "amount": 100_i64,
            "ticket_code": format!("TEMP-{}", Uuid::new_v4().simple()),
            "state": state,
            "purchase_date": DateTime::now(),
            "version": 0_i64,
        })
        .await
        .unwrap();

    ticket
}

pub async fn find_ticket(collection: &Collection<Document>, id: Uuid) -> Document {
    collection
        .find_one(doc! { "_id": bson::Uuid::from(id) })
        .await
        .unwrap()
        .unwrap()
}

pub async fn open_channel() -> (Connection, Channel) {
    let connection_string = env_var("TICKET_LIFECYCLE_RABBITMQ_CONNECTION_STRING");
    let args = OpenConnectionArguments::try_from(connection_string.as_str()).unwrap();
    let connection = Connection::open(&args).await.unwrap();
    let channel = connection.open_channel(None).await.unwrap();

    (connection, channel)
}

pub async fn publish(channel: &Channel, exchange: &str, routing_key: &str, content: Vec<u8>) {
    let basic_properties = BasicProperties::default().with_persistence(true).finish();
    let args = BasicPublishArguments::new(exchange, routing_key);

    channel
        .basic_publish(basic_properties, content, args)
        .await
        .unwrap();
}
