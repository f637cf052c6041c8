use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use zset_types::{ChangeSet, Field, FieldValueScore, Key, Presence};

use crate::error::{StoreError, StoreResult};
use crate::memory::Store;
use crate::traits::KeyStore;

/// A deferred computation against the store. It carries its own reply
/// channel, so the worker only has to run it.
type Job = Box<dyn FnOnce(&mut Store) + Send>;

enum Token {
    Run(Job),
    Stop(oneshot::Sender<Store>),
}

/// Single worker that owns the [`Store`] and runs submitted jobs one at a
/// time.
///
/// Jobs take effect in dequeue order. The worker never submits work to its
/// own queue. A stop token closes the queue, drains whatever was already
/// submitted, then hands the store back to the caller of
/// [`StoreHandle::stop`].
pub struct Serialiser {
    store: Store,
    queue: mpsc::UnboundedReceiver<Token>,
}

impl Serialiser {
    /// Create a worker and the handle used to submit work to it.
    pub fn new(store: Store) -> (Self, StoreHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { store, queue: rx }, StoreHandle { queue: tx })
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(store: Store) -> StoreHandle {
        let (worker, handle) = Self::new(store);
        tokio::spawn(worker.run());
        handle
    }

    /// Run the worker loop until a stop token arrives or every handle is
    /// dropped.
    pub async fn run(mut self) {
        info!(buckets = self.store.len(), "serialiser started");
        let mut processed: u64 = 0;

        while let Some(token) = self.queue.recv().await {
            match token {
                Token::Run(job) => {
                    job(&mut self.store);
                    processed += 1;
                }
                Token::Stop(reply) => {
                    self.queue.close();
                    while let Some(token) = self.queue.recv().await {
                        // A second stop loses the race; dropping its reply
                        // reports shutdown to that caller.
                        if let Token::Run(job) = token {
                            job(&mut self.store);
                            processed += 1;
                        }
                    }
                    info!(processed, "serialiser stopped");
                    let _ = reply.send(self.store);
                    return;
                }
            }
        }

        info!(processed, "serialiser exited: all handles dropped");
    }
}

/// Cloneable submission endpoint of a [`Serialiser`].
///
/// Dropping the future returned by any method does not cancel the job once
/// it has been submitted; the worker still runs it and discards the result.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    queue: mpsc::UnboundedSender<Token>,
}

impl StoreHandle {
    /// Submit a computation and wait for its outcome.
    ///
    /// Fails with [`StoreError::Shutdown`] when the worker no longer accepts
    /// work or stopped before running the job.
    pub async fn submit<R, F>(&self, op: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Store) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let job: Job = Box::new(move |store| {
            // The requester may have gone away; the effect is kept either way.
            let _ = reply.send(op(store));
        });
        self.queue
            .send(Token::Run(job))
            .map_err(|_| StoreError::Shutdown)?;
        outcome.await.map_err(|_| StoreError::Shutdown)
    }

    /// Stop the worker after draining already-submitted jobs and return the
    /// store it owned.
    pub async fn stop(&self) -> StoreResult<Store> {
        let (reply, store) = oneshot::channel();
        self.queue
            .send(Token::Stop(reply))
            .map_err(|_| StoreError::Shutdown)?;
        let store = store.await.map_err(|_| StoreError::Shutdown)?;
        debug!(buckets = store.len(), "store handed back");
        Ok(store)
    }

    /// Returns `true` once the worker has stopped accepting work.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

#[async_trait]
impl KeyStore for StoreHandle {
    async fn insert(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        let key = key.clone();
        self.submit(move |store| store.insert(&key, members)).await?
    }

    async fn delete(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        let key = key.clone();
        self.submit(move |store| store.delete(&key, members)).await?
    }

    async fn select(&self, key: &Key, field: &Field) -> StoreResult<FieldValueScore> {
        let (key, field) = (key.clone(), field.clone());
        self.submit(move |store| store.select(&key, &field)).await?
    }

    async fn keys(&self) -> StoreResult<Vec<Key>> {
        self.submit(|store| store.keys()).await?
    }

    async fn size(&self, key: &Key) -> StoreResult<i64> {
        let key = key.clone();
        self.submit(move |store| store.size(&key)).await?
    }

    async fn members(&self, key: &Key) -> StoreResult<Vec<Field>> {
        let key = key.clone();
        self.submit(move |store| store.members(&key)).await?
    }

    async fn score(&self, key: &Key, field: &Field) -> StoreResult<Presence> {
        let (key, field) = (key.clone(), field.clone());
        self.submit(move |store| store.score(&key, &field)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;

    fn key(name: &str) -> Key {
        Key::new(name).unwrap()
    }

    fn field(name: &str) -> Field {
        Field::new(name).unwrap()
    }

    fn member(name: &str, score: i64) -> FieldValueScore {
        FieldValueScore::new(field(name), Bytes::from(score.to_be_bytes().to_vec()), score)
    }

    #[tokio::test]
    async fn operations_through_handle() {
        let handle = Serialiser::spawn(Store::new());

        let changes = handle.insert(&key("K1"), vec![member("F", 5)]).await.unwrap();
        assert!(changes.accepted(&field("F")));

        let record = handle.select(&key("K1"), &field("F")).await.unwrap();
        assert_eq!(record.score, 5);
        assert_eq!(handle.size(&key("K1")).await.unwrap(), 1);
        assert_eq!(handle.members(&key("K1")).await.unwrap(), vec![field("F")]);
        assert_eq!(handle.keys().await.unwrap(), vec![key("K1")]);
        assert_eq!(
            handle.score(&key("K1"), &field("F")).await.unwrap(),
            Presence::stored(5)
        );

        let err = handle.select(&key("K1"), &field("G")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn jobs_run_in_submission_order() {
        let handle = Serialiser::spawn(Store::new());
        let mut observed = Vec::new();
        for score in 0..10 {
            let size = handle
                .submit(move |store| {
                    let k = Key::new("k").unwrap();
                    let f = Field::new(format!("f{score}")).unwrap();
                    store.insert(&k, vec![FieldValueScore::new(f, Bytes::new(), score)]).unwrap();
                    store.size(&k).unwrap()
                })
                .await
                .unwrap();
            observed.push(size);
        }
        assert_eq!(observed, (1..=10).collect::<Vec<i64>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_converge_on_max_score() {
        let handle = Arc::new(Serialiser::spawn(Store::new()));
        let mut tasks = Vec::new();
        for writer in 0..8i64 {
            let handle = Arc::clone(&handle);
            tasks.push(tokio::spawn(async move {
                for step in 0..50i64 {
                    let score = step * 8 + writer;
                    handle.insert(&key("hot"), vec![member("F", score)]).await.unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let record = handle.select(&key("hot"), &field("F")).await.unwrap();
        assert_eq!(record.score, 49 * 8 + 7);
        assert_eq!(&record.value[..], &(49i64 * 8 + 7).to_be_bytes()[..]);
    }

    #[tokio::test]
    async fn stop_drains_submitted_work() {
        let handle = Serialiser::spawn(Store::new());

        let (key_a, key_b) = (key("a"), key("b"));
        let (first, second, stopped) = tokio::join!(
            handle.insert(&key_a, vec![member("F", 1)]),
            handle.insert(&key_b, vec![member("F", 2)]),
            handle.stop(),
        );
        assert!(first.is_ok());
        assert!(second.is_ok());

        let store = stopped.unwrap();
        assert_eq!(store.keys().unwrap(), vec![key("a"), key("b")]);
    }

    #[tokio::test]
    async fn submission_after_stop_fails() {
        let handle = Serialiser::spawn(Store::new());
        handle.stop().await.unwrap();

        assert!(handle.is_closed());
        let err = handle.keys().await.unwrap_err();
        assert_eq!(err, StoreError::Shutdown);
        assert_eq!(handle.stop().await.unwrap_err(), StoreError::Shutdown);
    }

    #[tokio::test]
    async fn dropped_requester_keeps_effect() {
        let handle = Serialiser::spawn(Store::new());

        // Polled once so the job is queued, then dropped on the zero deadline.
        let key_k = key("k");
        let pending = handle.insert(&key_k, vec![member("F", 3)]);
        let _ = tokio::time::timeout(std::time::Duration::ZERO, pending).await;

        assert_eq!(
            handle.score(&key("k"), &field("F")).await.unwrap(),
            Presence::stored(3)
        );
    }
}
