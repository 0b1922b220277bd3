// glacier-restore/src/restore/input.rs
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads one key per line and prepends `prefix` verbatim.
///
/// Only trailing whitespace is trimmed; leading whitespace stays part of the
/// key. Empty lines become empty keys. A read error aborts the whole read.
pub async fn read_keys<R>(source: R, prefix: &str) -> Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = source.lines();
    let mut keys = Vec::new();
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("Failed to read key list at line {}", keys.len() + 1))?
    {
        keys.push(format!("{}{}", prefix, line.trim_end()));
    }
    Ok(keys)
}
