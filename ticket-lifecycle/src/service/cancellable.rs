use crate::error::Error;
use rabbitmq_client::consumer::DeliveryCancellation;
use std::future::Future;

///
/// Runs `future` unless the delivery gets cancelled first.
///
/// ### Errors
/// - [Error::Cancelled] when delivery was cancelled before `future` completed
/// - error returned by `future`
///
pub async fn cancellable<T, E, F>(
    cancellation: &mut DeliveryCancellation,
    future: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
    Error: From<E>,
{
    tokio::select! {
        biased;

        _ = cancellation.cancelled() => Err(Error::Cancelled),
        result = future => Ok(result?),
    }
}
