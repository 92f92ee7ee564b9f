use super::dto::PublisherConfirm;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::oneshot;

///
/// Messages published on the channel that still wait for publisher confirm,
/// keyed by delivery tag.
///
#[derive(Clone, Default)]
pub struct PendingConfirms {
    inner: Arc<Mutex<BTreeMap<u64, oneshot::Sender<PublisherConfirm>>>>,
}

impl PendingConfirms {
    pub fn register(&self, delivery_tag: u64) -> oneshot::Receiver<PublisherConfirm> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(delivery_tag, tx);
        rx
    }

    pub fn remove(&self, delivery_tag: u64) {
        self.lock().remove(&delivery_tag);
    }

    ///
    /// Resolves confirmed message.
    /// With `multiple` set every message up to and including `delivery_tag` is resolved.
    ///
    pub fn resolve(&self, delivery_tag: u64, multiple: bool, confirm: PublisherConfirm) {
        let mut pending = self.lock();

        let resolved = match multiple {
            true => {
                let remaining = pending.split_off(&(delivery_tag + 1));
                std::mem::replace(&mut *pending, remaining)
            }
            false => pending
                .remove_entry(&delivery_tag)
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
        };

        if resolved.is_empty() {
            tracing::trace!(delivery_tag, "message already confirmed");
        }

        for (_, tx) in resolved {
            // publisher may have stopped waiting after timeout
            let _ = tx.send(confirm);
        }
    }

    ///
    /// Drops all pending messages. Their publishers receive closed channel error.
    ///
    pub fn fail_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, oneshot::Sender<PublisherConfirm>>> {
        // map is never left in an inconsistent state so poisoning can be ignored
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
