///
/// Returned by delivery callback when delivery couldn't be processed.
/// Delivery will be nacked and put back to the queue if `requeue` is set.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("failed to consume delivery (requeue: {requeue})")]
pub struct ConsumeError {
    pub requeue: bool,
}

impl ConsumeError {
    pub fn requeue() -> Self {
        Self { requeue: true }
    }

    pub fn reject() -> Self {
        Self { requeue: false }
    }
}
