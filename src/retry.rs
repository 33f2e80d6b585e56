//! Runs units of work inside store transactions and re-runs them on serialization conflicts.
//!
//! Every attempt gets a fresh transaction. A conflicting attempt is rolled back before the
//! backoff sleep starts, so nothing is held open while waiting. Any other error rolls back and
//! returns at once.
//!
//! The optional deadline bounds starting attempts, the unit of work and the backoff sleeps.
//! It never interrupts a commit: once `commit` is issued its outcome is what the caller gets.

use backon::{ExponentialBuilder, Retryable};
use futures::future::BoxFuture;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::db::{StoreClient, StoreTx};
use crate::error::{InventoryError, IsRetryable};

/// Lifecycle of one logical operation as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Started,
    Executing,
    Committed,
    ConflictRetry,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RetryExecutor {
    backoff: ExponentialBuilder,
    deadline: Option<Duration>,
}

/// A configured deadline pinned to the moment an operation started.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    limit: Duration,
    at: Instant,
}

impl Deadline {
    fn passed(&self) -> bool {
        Instant::now() >= self.at
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryExecutor {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(cfg.base_delay())
            .with_max_delay(cfg.max_delay())
            .with_factor(2.0);
        // backon counts retries, the config counts attempts.
        let backoff = match cfg.max_attempts() {
            Some(attempts) => backoff.with_max_times(attempts.saturating_sub(1)),
            None => backoff.with_max_times(usize::MAX),
        };
        let backoff = if cfg.jitter {
            backoff.with_jitter()
        } else {
            backoff
        };

        Self {
            backoff,
            deadline: cfg.deadline(),
        }
    }

    /// Run `work` in a transaction, committing on success.
    ///
    /// `work` may run several times and must not rely on effects of a previous attempt.
    /// Conflicts that outlast the attempt cap or the deadline come back as
    /// `InventoryError::RetryExhausted`.
    pub async fn run<C, T, F>(&self, op: &'static str, client: &C, work: F) -> Result<T, InventoryError>
    where
        C: StoreClient,
        T: Send,
        F: for<'t> Fn(&'t mut C::Tx) -> BoxFuture<'t, Result<T, InventoryError>> + Send + Sync,
    {
        let deadline = self.deadline.map(|limit| Deadline {
            limit,
            at: Instant::now() + limit,
        });
        let attempts = AtomicUsize::new(0);
        let last_conflict: Mutex<Option<String>> = Mutex::new(None);

        debug!(op, state = ?TxState::Started, "transaction started");

        let attempt_once = || async {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let res = run_attempt(op, attempt, client, &work, deadline).await;
            if let Err(InventoryError::SerializationConflict(msg)) = &res
                && let Ok(mut slot) = last_conflict.lock()
            {
                *slot = Some(msg.clone());
            }
            res
        };

        let outcome = attempt_once
            .retry(self.backoff)
            .when(|err: &InventoryError| err.is_retryable() && !deadline.is_some_and(|d| d.passed()))
            .notify(|err, dur: Duration| {
                warn!(
                    op,
                    attempt = attempts.load(Ordering::SeqCst),
                    state = ?TxState::ConflictRetry,
                    error = %err,
                    "retrying transaction after {:?}",
                    dur
                );
            })
            .await;

        let attempts = attempts.load(Ordering::SeqCst);
        match outcome {
            Ok(value) => Ok(value),
            Err(InventoryError::DeadlineElapsed(limit)) => {
                let last = last_conflict
                    .lock()
                    .ok()
                    .and_then(|mut slot| slot.take())
                    .map_or(InventoryError::DeadlineElapsed(limit), InventoryError::SerializationConflict);
                warn!(op, attempts, state = ?TxState::Failed, "transaction deadline elapsed");
                Err(InventoryError::RetryExhausted {
                    attempts,
                    last: Box::new(last),
                })
            }
            Err(err) if err.is_retryable() => {
                warn!(op, attempts, state = ?TxState::Failed, error = %err, "transaction retries exhausted");
                Err(InventoryError::RetryExhausted {
                    attempts,
                    last: Box::new(err),
                })
            }
            Err(err) => {
                debug!(op, attempts, state = ?TxState::Failed, error = %err, "transaction failed");
                Err(err)
            }
        }
    }
}

async fn run_attempt<C, T, F>(
    op: &'static str,
    attempt: usize,
    client: &C,
    work: &F,
    deadline: Option<Deadline>,
) -> Result<T, InventoryError>
where
    C: StoreClient,
    T: Send,
    F: for<'t> Fn(&'t mut C::Tx) -> BoxFuture<'t, Result<T, InventoryError>> + Send + Sync,
{
    // A backoff sleep may have run past the deadline.
    if let Some(d) = deadline
        && d.passed()
    {
        return Err(InventoryError::DeadlineElapsed(d.limit));
    }

    let mut tx = client.begin().await?;
    debug!(op, attempt, state = ?TxState::Executing, "transaction attempt");

    let outcome = match deadline {
        Some(d) => tokio::time::timeout_at(d.at, work(&mut tx))
            .await
            .unwrap_or(Err(InventoryError::DeadlineElapsed(d.limit))),
        None => work(&mut tx).await,
    };

    match outcome {
        Ok(value) => {
            // Runs to completion regardless of the deadline. A failed commit has already been
            // aborted by the store.
            tx.commit().await?;
            debug!(op, attempt, state = ?TxState::Committed, "transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(op, attempt, error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
