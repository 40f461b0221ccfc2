//! Background persistence
//!
//! Snapshots are handed to a writer thread over a channel so a slow storage
//! backend never delays the next cart mutation. When several snapshots queue
//! up, only the newest one is written.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use tracing::{debug, warn};

use crate::{
    cart::CartState,
    clock::Clock,
    persistence::{PersistenceError, save_cart, storage::CartStorage},
    store::{CartStore, SubscriptionKey},
};

enum Message {
    Snapshot(Arc<CartState>),
    Stop,
}

/// Writer thread that persists cart snapshots under a single key.
#[derive(Debug)]
pub struct PersistenceWorker {
    sender: Sender<Message>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    /// Start a writer thread for `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Spawn`] if the thread cannot be started.
    pub fn spawn<S>(storage: S, key: impl Into<String>) -> Result<Self, PersistenceError>
    where
        S: CartStorage + 'static,
    {
        let key = key.into();
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cart-persistence".to_string())
            .spawn(move || run(storage, &key, &receiver))
            .map_err(PersistenceError::Spawn)?;

        Ok(Self {
            sender,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot for writing. Never blocks.
    pub fn enqueue(&self, state: Arc<CartState>) {
        send_snapshot(&self.sender, state);
    }

    /// Subscribe to `store` so every new state is queued for writing.
    ///
    /// Pass the returned key to [`CartStore::unsubscribe`] to detach.
    pub fn attach<C: Clock>(&self, store: &mut CartStore<C>) -> SubscriptionKey {
        let sender = self.sender.clone();

        store.subscribe(move |state| send_snapshot(&sender, Arc::clone(state)))
    }

    /// Write the newest queued snapshot and stop the thread.
    ///
    /// Stores the worker was attached to keep their subscription until they
    /// [`unsubscribe`](CartStore::unsubscribe); their snapshots are dropped
    /// from now on.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::WorkerPanicked`] if the writer thread panicked.
    pub fn shutdown(mut self) -> Result<(), PersistenceError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), PersistenceError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        if self.sender.send(Message::Stop).is_err() {
            debug!("persistence worker already exited");
        }

        handle
            .join()
            .map_err(|_panic| PersistenceError::WorkerPanicked)
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(%err, "persistence worker did not stop cleanly");
        }
    }
}

fn send_snapshot(sender: &Sender<Message>, state: Arc<CartState>) {
    if sender.send(Message::Snapshot(state)).is_err() {
        debug!("persistence worker has stopped; dropping cart snapshot");
    }
}

fn run<S: CartStorage>(mut storage: S, key: &str, receiver: &Receiver<Message>) {
    loop {
        let (mut latest, mut stop) = match receiver.recv() {
            Ok(Message::Snapshot(state)) => (Some(state), false),
            Ok(Message::Stop) | Err(_) => (None, true),
        };

        let mut skipped = 0_usize;

        while !stop {
            match receiver.try_recv() {
                Ok(Message::Snapshot(state)) => {
                    skipped += usize::from(latest.replace(state).is_some());
                }
                Ok(Message::Stop) => stop = true,
                Err(_) => break,
            }
        }

        if let Some(state) = latest {
            match save_cart(&mut storage, key, &state) {
                Ok(()) => debug!(
                    key,
                    skipped,
                    lines = state.line_count(),
                    "persisted cart snapshot"
                ),
                Err(err) => warn!(key, %err, "failed to persist cart snapshot"),
            }
        }

        if stop {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::Sequence;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        clock::FixedClock,
        persistence::{
            MemoryStorage, StorageError, load_cart, storage::MockCartStorage,
        },
        products::{Product, Sku},
    };

    use super::*;

    fn store() -> CartStore<FixedClock> {
        CartStore::with_clock(iso::VND, FixedClock::default())
    }

    #[test]
    fn attached_worker_persists_latest_state() -> TestResult {
        let storage = MemoryStorage::new();
        let worker = PersistenceWorker::spawn(storage.clone(), "cart")?;
        let mut store = store();

        worker.attach(&mut store);

        store.add_item(
            Some(Product::new("p1", "Netflix")),
            Some(Sku::new("sku1", "1 month", 369_000, iso::VND)),
            1,
        )?;
        store.update_quantity("sku1", 2)?;

        worker.shutdown()?;

        let saved = load_cart(&storage, "cart")?.ok_or("nothing persisted")?;

        assert_eq!(&saved, store.state());

        Ok(())
    }

    #[test]
    fn enqueue_after_shutdown_of_attached_store_is_harmless() -> TestResult {
        let worker = PersistenceWorker::spawn(MemoryStorage::new(), "cart")?;
        let mut store = store();

        let key = worker.attach(&mut store);
        worker.shutdown()?;

        store.add_item(
            Some(Product::new("p1", "Netflix")),
            Some(Sku::new("sku1", "1 month", 369_000, iso::VND)),
            1,
        )?;

        assert_eq!(store.state().line_count(), 1);
        assert!(store.unsubscribe(key));

        Ok(())
    }

    #[test]
    fn failed_writes_do_not_stop_the_worker() -> TestResult {
        let (failed_tx, failed_rx) = mpsc::channel();
        let (saved_tx, saved_rx) = mpsc::channel();
        let mut seq = Sequence::new();
        let mut storage = MockCartStorage::new();

        storage
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| {
                assert!(failed_tx.send(()).is_ok(), "failure went unobserved");
                Err(StorageError::InvalidKey("first".to_string()))
            });
        storage
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, value| {
                assert!(saved_tx.send(value.to_string()).is_ok(), "save went unobserved");
                Ok(())
            });

        let worker = PersistenceWorker::spawn(storage, "cart")?;
        let empty = Arc::new(store().state().clone());

        worker.enqueue(Arc::clone(&empty));
        failed_rx.recv_timeout(Duration::from_secs(5))?;

        let mut filled = store();
        filled.add_item(
            Some(Product::new("p1", "Netflix")),
            Some(Sku::new("sku1", "1 month", 369_000, iso::VND)),
            1,
        )?;

        worker.enqueue(filled.snapshot());
        worker.shutdown()?;

        let written = saved_rx.try_recv()?;

        assert!(written.contains("sku1"), "{written}");

        Ok(())
    }
}
