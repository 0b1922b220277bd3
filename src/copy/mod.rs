// glacier-restore/src/copy/mod.rs
use anyhow::{Context, Result};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::config::{AppConfig, CopyConfig, OperationConfig};

/// Public entry point for copy-command generation. Reads keys from stdin and
/// prints one `aws s3 cp` line per key that is not yet under the export
/// directory. Makes no remote calls; the output is meant for an external
/// parallel runner.
pub async fn run_copy_flow(app_config: &AppConfig) -> Result<()> {
    let copy_config = match &app_config.operation {
        Some(OperationConfig::CopyCommands(cfg)) => cfg,
        _ => anyhow::bail!("Copy-command operation selected but no copy configuration found."),
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = BufWriter::new(std::io::stdout());
    let (printed, skipped) = write_copy_commands(stdin, copy_config, &mut out).await?;
    out.flush().context("Failed to flush copy commands to stdout")?;

    info!(printed, skipped, "copy command generation finished");
    Ok(())
}

/// Returns `(commands written, keys skipped because already exported)`.
pub async fn write_copy_commands<R, W>(
    source: R,
    copy_config: &CopyConfig,
    out: &mut W,
) -> Result<(usize, usize)>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = source.lines();
    let mut printed = 0;
    let mut skipped = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read key list")?
    {
        let key = line.trim();
        if key.is_empty() {
            continue;
        }

        let local_path = export_path(&copy_config.export_dir, key);
        let exists = tokio::fs::try_exists(&local_path)
            .await
            .with_context(|| format!("Failed to check {}", local_path.display()))?;
        if exists {
            debug!(key, "already exported, skipping");
            skipped += 1;
            continue;
        }

        writeln!(
            out,
            "aws s3 cp \"s3://{}/{}\" \"{}\"",
            shell_escape(&copy_config.container),
            shell_escape(key),
            shell_escape(&local_path.to_string_lossy())
        )?;
        printed += 1;
    }
    Ok((printed, skipped))
}

/// `<export_dir>/<key>`, keeping the key verbatim even when it starts with '/'.
fn export_path(export_dir: &Path, key: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/{}",
        export_dir.to_string_lossy().trim_end_matches('/'),
        key
    ))
}

/// Escapes the characters that stay special inside double quotes.
fn shell_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(export_dir: &Path) -> CopyConfig {
        CopyConfig {
            container: "archive.bucket".to_string(),
            export_dir: export_dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_skips_keys_already_exported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let export_dir = dir.path().join("export");
        fs::create_dir_all(export_dir.join("2019"))?;
        fs::write(export_dir.join("2019/done.csv"), b"x")?;

        let input = "2019/done.csv\n  2019/todo.csv  \n\n";
        let mut out = Vec::new();
        let (printed, skipped) =
            write_copy_commands(input.as_bytes(), &config(&export_dir), &mut out).await?;

        assert_eq!((printed, skipped), (1, 1));
        assert_eq!(
            String::from_utf8(out)?,
            format!(
                "aws s3 cp \"s3://archive.bucket/2019/todo.csv\" \"{}/2019/todo.csv\"\n",
                export_dir.display()
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_relative_export_dir() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let config = CopyConfig {
            container: "b".to_string(),
            export_dir: PathBuf::from("export-does-not-exist/"),
        };
        write_copy_commands("k.txt\n".as_bytes(), &config, &mut out).await?;
        assert_eq!(
            String::from_utf8(out)?,
            "aws s3 cp \"s3://b/k.txt\" \"export-does-not-exist/k.txt\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape("plain/key.txt"), "plain/key.txt");
        assert_eq!(shell_escape("a\"b$c`d\\e"), "a\\\"b\\$c\\`d\\\\e");
    }
}
