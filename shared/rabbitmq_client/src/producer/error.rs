#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("basic publish failed: {0}")]
    Publish(#[from] amqprs::error::Error),

    #[error("message nacked by the server")]
    Nacked,

    #[error("publisher confirm not received in time")]
    ConfirmTimeout,

    #[error("publishing stopped by flow control or blocked connection")]
    Blocked,

    #[error("channel closed before publisher confirm was received")]
    ChannelClosed,
}
