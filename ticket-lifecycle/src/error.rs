use crate::repository;
use rabbitmq_client::producer::PublishError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] repository::Error),

    #[error("producer error: {0}")]
    Producer(#[from] PublishError),

    #[error("delivery cancelled")]
    Cancelled,

    #[error("unexpected error: {0}")]
    UnexpectedError(#[from] anyhow::Error),
}
