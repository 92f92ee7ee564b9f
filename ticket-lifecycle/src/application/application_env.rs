use anyhow::anyhow;
use std::{net::SocketAddr, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub metrics_bind_address: SocketAddr,

    pub db_connection_string: String,
    pub db_name: String,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_max_open_attempts: u32,
    pub rabbitmq_prefetch_count: u16,
    pub rabbitmq_confirm_timeout: Duration,
    pub rabbitmq_payments_exchange_name: String,
    pub rabbitmq_seats_exchange_name: String,
    pub rabbitmq_tickets_exchange_name: String,
    pub rabbitmq_seat_released_queue_name: String,
    pub rabbitmq_payment_approved_queue_name: String,
    pub rabbitmq_payment_confirmed_queue_name: String,
    pub rabbitmq_payment_rejected_queue_name: String,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TICKET_LIFECYCLE_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TICKET_LIFECYCLE_LOG_FILENAME")?;
        let metrics_bind_address =
            Self::env_var("TICKET_LIFECYCLE_METRICS_BIND_ADDRESS")?.parse()?;
        let db_connection_string = Self::env_var("TICKET_LIFECYCLE_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("TICKET_LIFECYCLE_DB_NAME")?;
        let rabbitmq_connection_string =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_RETRY_INTERVAL")?.parse()?;
        let rabbitmq_retry_interval = Duration::from_secs(rabbitmq_retry_interval);
        let rabbitmq_max_open_attempts =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_MAX_OPEN_ATTEMPTS")?.parse()?;
        let rabbitmq_prefetch_count =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_PREFETCH_COUNT")?.parse()?;
        let rabbitmq_confirm_timeout =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_CONFIRM_TIMEOUT")?.parse()?;
        let rabbitmq_confirm_timeout = Duration::from_secs(rabbitmq_confirm_timeout);
        let rabbitmq_payments_exchange_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_PAYMENTS_EXCHANGE_NAME")?;
        let rabbitmq_seats_exchange_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_SEATS_EXCHANGE_NAME")?;
        let rabbitmq_tickets_exchange_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_TICKETS_EXCHANGE_NAME")?;
        let rabbitmq_seat_released_queue_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_SEAT_RELEASED_QUEUE_NAME")?;
        let rabbitmq_payment_approved_queue_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_PAYMENT_APPROVED_QUEUE_NAME")?;
        let rabbitmq_payment_confirmed_queue_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_PAYMENT_CONFIRMED_QUEUE_NAME")?;
        let rabbitmq_payment_rejected_queue_name =
            Self::env_var("TICKET_LIFECYCLE_RABBITMQ_PAYMENT_REJECTED_QUEUE_NAME")?;

        if rabbitmq_prefetch_count == 0 {
            anyhow::bail!("TICKET_LIFECYCLE_RABBITMQ_PREFETCH_COUNT must be greater than 0");
        }

        Ok(Self {
            log_directory,
            log_filename,
            metrics_bind_address,
            db_connection_string,
            db_name,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_max_open_attempts,
            rabbitmq_prefetch_count,
            rabbitmq_confirm_timeout,
            rabbitmq_payments_exchange_name,
            rabbitmq_seats_exchange_name,
            rabbitmq_tickets_exchange_name,
            rabbitmq_seat_released_queue_name,
            rabbitmq_payment_approved_queue_name,
            rabbitmq_payment_confirmed_queue_name,
            rabbitmq_payment_rejected_queue_name,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }
}
