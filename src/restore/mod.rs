pub(crate) mod input;
pub(crate) mod orchestrator;
pub(crate) mod report;
pub(crate) mod submitter;
pub(crate) mod tier;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, OperationConfig, RestoreConfig};
use crate::storage::ArchiveStore;
use crate::storage::types::TierRequest;
use orchestrator::BatchOptions;
use report::{BatchReport, BatchReporter, ConsoleReporter};
use submitter::RestoreSubmitter;

/// Public entry point for the restore process: reads keys from stdin and
/// restores them, printing progress and failures to stdout.
pub async fn run_restore_flow(
    app_config: &AppConfig,
    store: Arc<dyn ArchiveStore>,
) -> Result<BatchReport> {
    let restore_config = match &app_config.operation {
        Some(OperationConfig::Restore(cfg)) => cfg,
        _ => anyhow::bail!("Restore operation selected but no restore configuration found."),
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let keys = input::read_keys(stdin, &restore_config.prefix)
        .await
        .context("Failed to read keys from stdin")?;

    let mut reporter = ConsoleReporter::stdout();
    restore_keys(store, restore_config, keys, &mut reporter).await
}

/// Restores an already-read key list with the given configuration.
pub async fn restore_keys(
    store: Arc<dyn ArchiveStore>,
    restore_config: &RestoreConfig,
    keys: Vec<String>,
    reporter: &mut dyn BatchReporter,
) -> Result<BatchReport> {
    if restore_config.tier == TierRequest::Fastest {
        info!(
            keys = keys.len(),
            "fastest tier: one extra metadata request per key to read its storage class"
        );
    }

    let submitter = RestoreSubmitter::new(store, restore_config.container.clone())
        .with_call_timeout(restore_config.call_timeout);

    let options = BatchOptions {
        concurrency: restore_config.jobs,
        progress_every: restore_config.progress_every,
    };

    orchestrator::run_batch(
        Arc::new(submitter),
        keys,
        restore_config.tier,
        &options,
        reporter,
    )
    .await
    .with_context(|| format!("Restore batch against bucket {} failed", restore_config.container))
}
