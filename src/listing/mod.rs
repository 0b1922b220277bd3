pub(crate) mod enumerator;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use std::io::{BufWriter, Write};
use tracing::info;

use crate::config::{AppConfig, ListConfig, OperationConfig};
use crate::storage::ArchiveStore;

/// Public entry point for the list process. Prints matching keys to stdout.
pub async fn run_list_flow(app_config: &AppConfig, store: &dyn ArchiveStore) -> Result<()> {
    let list_config = match &app_config.operation {
        Some(OperationConfig::List(cfg)) => cfg,
        _ => anyhow::bail!("List operation selected but no list configuration found."),
    };

    let mut out = BufWriter::new(std::io::stdout());
    let printed = print_listing(store, list_config, &mut out).await?;
    out.flush().context("Failed to flush listing to stdout")?;

    info!(
        bucket = %list_config.container,
        printed, "listing finished"
    );
    Ok(())
}

/// Writes the header line, then one key per line for every object whose
/// storage class is in `storage_classes` (all objects when that is empty).
/// Returns the number of keys written.
pub async fn print_listing<W: Write>(
    store: &dyn ArchiveStore,
    list_config: &ListConfig,
    out: &mut W,
) -> Result<usize> {
    writeln!(
        out,
        "Working on {} prefix: {}",
        list_config.container, list_config.prefix
    )?;

    let show_all = list_config.storage_classes.is_empty();
    let mut printed = 0;
    let mut objects = Box::pin(enumerator::enumerate(
        store,
        &list_config.container,
        &list_config.prefix,
    ));
    while let Some(object) = objects.try_next().await.with_context(|| {
        format!(
            "Failed to list objects in {} under prefix '{}'",
            list_config.container, list_config.prefix
        )
    })? {
        if show_all || list_config.storage_classes.contains(&object.storage_tier) {
            writeln!(out, "{}", object.key)?;
            printed += 1;
        }
    }
    Ok(printed)
}
