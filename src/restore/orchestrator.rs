// glacier-restore/src/restore/orchestrator.rs
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::report::{BatchReport, BatchReporter};
use super::submitter::{RestoreOutcome, RestoreSubmitter};
use crate::config::{DEFAULT_JOBS, DEFAULT_PROGRESS_EVERY};
use crate::errors::RestoreError;
use crate::storage::types::TierRequest;

/// Keys queued per worker ahead of the one it is running.
const QUEUED_PER_WORKER: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Number of restore calls in flight at once.
    pub concurrency: usize,
    /// Report the completed count every this many completions.
    pub progress_every: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_JOBS,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Submits every key through `submitter` using `concurrency` worker tasks and
/// drains outcomes in completion order.
///
/// Each key produces exactly one outcome and a failure never stops the batch.
/// At most `concurrency * (QUEUED_PER_WORKER + 1)` keys are queued or running
/// at any time; the rest wait in `keys`.
pub async fn run_batch(
    submitter: Arc<RestoreSubmitter>,
    keys: Vec<String>,
    tier: TierRequest,
    options: &BatchOptions,
    reporter: &mut dyn BatchReporter,
) -> Result<BatchReport> {
    if options.concurrency == 0 {
        anyhow::bail!("concurrency must be at least 1");
    }
    if options.progress_every == 0 {
        anyhow::bail!("progress interval must be at least 1");
    }

    let total = keys.len();
    let mut report = BatchReport::new(total);
    reporter.on_start(total);
    info!(
        total,
        concurrency = options.concurrency,
        tier = %tier,
        "starting restore batch"
    );

    // mpmc channel feeding keys to the workers. Bounded so memory follows
    // concurrency rather than batch size.
    let (key_tx, key_rx) =
        async_channel::bounded::<String>(options.concurrency * QUEUED_PER_WORKER);

    // Outcomes go to this task only, so the report needs no locking.
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<RestoreOutcome>(options.concurrency);

    let feeder = tokio::spawn(async move {
        for key in keys {
            if key_tx.send(key).await.is_err() {
                error!("restore workers stopped before all keys were queued");
                break;
            }
        }
        // Dropping key_tx closes the channel and lets idle workers exit.
    });

    let worker_count = options.concurrency.min(total.max(1));
    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let key_rx = key_rx.clone();
        let outcome_tx = outcome_tx.clone();
        let submitter = Arc::clone(&submitter);
        handles.push(tokio::spawn(async move {
            while let Ok(key) = key_rx.recv().await {
                let outcome = submit_isolated(&submitter, key, tier).await;
                if outcome_tx.send(outcome).await.is_err() {
                    error!(worker_id, "outcome channel closed, worker stopping");
                    break;
                }
            }
            debug!(worker_id, "restore worker finished");
        }));
    }
    // Only the workers hold senders now; the drain loop ends when they are all done.
    drop(outcome_tx);
    drop(key_rx);

    while let Some(outcome) = outcome_rx.recv().await {
        report.completed_count += 1;
        match outcome {
            RestoreOutcome::Success {
                key,
                http_status,
                raw_response,
            } => {
                debug!(key = %key, http_status, response = %raw_response, "restore accepted");
                reporter.on_success(&key);
                report.succeeded += 1;
            }
            RestoreOutcome::Failure { key, error } => {
                reporter.on_failure(&key, &error);
                report.failures.push((key, error));
            }
        }
        if report.completed_count % options.progress_every == 0 {
            reporter.on_progress(report.completed_count);
        }
    }

    for handle in futures::future::join_all(handles).await {
        if let Err(e) = handle {
            error!("restore worker task failed: {}", e);
        }
    }
    if let Err(e) = feeder.await {
        error!("key feeder task failed: {}", e);
    }

    if report.completed_count != total {
        error!(
            completed = report.completed_count,
            total, "restore batch lost outcomes"
        );
        anyhow::bail!(
            "restore batch produced {} outcomes for {} keys",
            report.completed_count,
            total
        );
    }

    info!(
        completed = report.completed_count,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "restore batch finished"
    );
    reporter.on_finish(&report);
    Ok(report)
}

/// Runs one submission on its own task so a panic inside it still yields a
/// failure outcome for that key.
async fn submit_isolated(
    submitter: &Arc<RestoreSubmitter>,
    key: String,
    tier: TierRequest,
) -> RestoreOutcome {
    let task_submitter = Arc::clone(submitter);
    let task_key = key.clone();
    match tokio::spawn(async move { task_submitter.submit(task_key, tier).await }).await {
        Ok(outcome) => outcome,
        Err(e) => RestoreOutcome::Failure {
            key,
            error: RestoreError::Aborted(e.to_string()),
        },
    }
}
