//! Wiring shared by the desktop app and the CLI: opening the repository,
//! picking the rate card, and queueing saves on the tokio runtime.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context as _;
use fulfill_core::db::{DbConfig, FulfillmentRepository, RepositoryError, RepositoryRegistry};
use fulfill_core::models::RateCard;
use fulfill_db_sqlite::SqliteRepositoryFactory;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::logging::log_task_error;

/// Every backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn connect(config: &DbConfig) -> anyhow::Result<Arc<dyn FulfillmentRepository>> {
    debug!(backend = %config.backend, db = %config.connection_string, "connecting");
    let repo = build_registry()
        .create(config)
        .await
        .with_context(|| format!("cannot open {} database", config.backend))?;
    Ok(Arc::from(repo))
}

/// Loads the named rate card. A card that does not exist falls back to the
/// published prices.
pub async fn load_rate_card(
    repo: &dyn FulfillmentRepository,
    name: &str,
) -> anyhow::Result<RateCard> {
    match repo.get_rate_card(name).await {
        Ok(card) => {
            info!(card = %card.name, "rate card loaded");
            Ok(card)
        }
        Err(RepositoryError::NotFound) => {
            warn!(card = name, "rate card not found, using published prices");
            Ok(RateCard::named(name))
        }
        Err(e) => Err(e).with_context(|| format!("cannot load rate card '{name}'")),
    }
}

type PersistFuture = Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send>>;

enum PersistJob {
    Run {
        task_name: &'static str,
        future: PersistFuture,
    },
    Flush(oneshot::Sender<()>),
}

/// Runs repository writes one at a time, in the order they were queued, so a
/// later save can never be overwritten by an earlier one.
#[derive(Clone)]
pub struct PersistQueue {
    sender: mpsc::UnboundedSender<PersistJob>,
}

impl PersistQueue {
    /// Starts the worker that drains the queue on `runtime`.
    pub fn start(runtime: &Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        runtime.spawn(async move {
            while let Some(job) = receiver.recv().await {
                match job {
                    PersistJob::Run { task_name, future } => {
                        log_task_error(task_name, future.await.map_err(anyhow::Error::from));
                    }
                    PersistJob::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("persist queue closed");
        });
        Self { sender }
    }

    fn push(
        &self,
        job: PersistJob,
    ) {
        if self.sender.send(job).is_err() {
            warn!("persist queue is gone, dropping write");
        }
    }

    /// Resolves once every write queued before this call has finished.
    pub async fn flush(&self) {
        let (done, finished) = oneshot::channel();
        self.push(PersistJob::Flush(done));
        let _ = finished.await;
    }
}

/// What the views need besides their own state.
#[derive(Clone)]
pub struct AppServices {
    pub repo: Arc<dyn FulfillmentRepository>,
    pub rate_card: Arc<RateCard>,
    persist: PersistQueue,
}

impl AppServices {
    pub fn new(
        repo: Arc<dyn FulfillmentRepository>,
        runtime: Handle,
        rate_card: RateCard,
    ) -> Self {
        Self {
            repo,
            rate_card: Arc::new(rate_card),
            persist: PersistQueue::start(&runtime),
        }
    }

    /// Queues a repository call without waiting for it. Calls run in the
    /// order they were queued. Failures are logged under `task_name`.
    pub fn spawn_persist<F, Fut>(
        &self,
        task_name: &'static str,
        task: F,
    ) where
        F: FnOnce(Arc<dyn FulfillmentRepository>) -> Fut,
        Fut: Future<Output = Result<(), RepositoryError>> + Send + 'static,
    {
        self.persist.push(PersistJob::Run {
            task_name,
            future: Box::pin(task(self.repo.clone())),
        });
    }

    /// Waits for every queued write.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }
}
