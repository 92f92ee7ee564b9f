use tokio::sync::watch;

///
/// Owner side of the delivery cancellation.
/// Cancelling it cancels every [DeliveryCancellation] created from it.
///
pub struct CancellationSource {
    cancelled_tx: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (cancelled_tx, _) = watch::channel(false);
        Self { cancelled_tx }
    }

    pub fn cancellation(&self) -> DeliveryCancellation {
        DeliveryCancellation {
            cancelled_rx: self.cancelled_tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.cancelled_tx.send_replace(true);
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

///
/// Cancellation signal handed to the delivery callback.
///
/// Dropping [CancellationSource] without cancelling
/// means the delivery will never be cancelled.
///
#[derive(Clone)]
pub struct DeliveryCancellation {
    cancelled_rx: watch::Receiver<bool>,
}

impl DeliveryCancellation {
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled_rx.borrow()
    }

    pub async fn cancelled(&mut self) {
        if self.cancelled_rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
