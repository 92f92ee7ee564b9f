use std::{fmt::Display, future::Future, time::Duration};

///
/// Run async function until it returns Ok or `max_attempts` is reached.
///
/// ### Errors
/// Returns the error of the last attempt
///
pub async fn retry<F, Fut, T, E>(
    retry_interval: Duration,
    max_attempts: u32,
    operation: &'static str,
    async_fn: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        tracing::info!(attempt, operation, "attempting");
        match async_fn().await {
            Ok(output) => return Ok(output),
            Err(err) if attempt >= max_attempts => {
                tracing::error!(attempt, operation, %err, "giving up");
                return Err(err);
            }
            Err(err) => tracing::warn!(attempt, operation, %err, "attempt failed"),
        }

        tokio::time::sleep(retry_interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = retry(Duration::ZERO, 5, "test", || async {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            match call {
                3 => Ok(call),
                _ => Err(format!("call {call} failed")),
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry(Duration::ZERO, 2, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("always failing".to_string())
        })
        .await;

        assert_eq!(result, Err("always failing".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
