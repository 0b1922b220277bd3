// glacier-restore/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{CopyArgs, ListArgs, RestoreArgs};
use crate::storage::types::{StorageTier, TierRequest};

pub const DEFAULT_CONFIG_FILE: &str = "glacier-restore.json";
pub const DEFAULT_JOBS: usize = 30;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_PROGRESS_EVERY: usize = 100;
pub const DEFAULT_EXPORT_DIR: &str = "export";

// Struct for deserializing glacier-restore.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJsonConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub jobs: Option<usize>,
    pub tier: Option<TierRequest>,
    pub call_timeout_secs: Option<u64>,
    pub progress_every: Option<usize>,
    pub export_dir: Option<PathBuf>,
}

/// Where and how to reach the object store. Credentials always come from the
/// ambient AWS chain.
#[derive(Debug, Clone, Default)]
pub struct RemoteSettings {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListConfig {
    pub container: String,
    pub prefix: String,
    /// Empty means every storage class.
    pub storage_classes: Vec<StorageTier>,
}

#[derive(Debug, Clone)]
pub struct RestoreConfig {
    pub container: String,
    pub prefix: String,
    pub jobs: usize,
    pub tier: TierRequest,
    pub call_timeout: Option<Duration>,
    pub progress_every: usize,
}

#[derive(Debug, Clone)]
pub struct CopyConfig {
    pub container: String,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub enum OperationConfig {
    List(ListConfig),
    Restore(RestoreConfig),
    CopyCommands(CopyConfig),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub operation: Option<OperationConfig>,
    pub remote: RemoteSettings,
    pub raw_json_config: RawJsonConfig,
}

impl AppConfig {
    /// Loads `path` if given (it must exist), otherwise the default config file
    /// if one is present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_json(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_json(default_path)
                } else {
                    Ok(Self::from_raw(RawJsonConfig::default()))
                }
            }
        }
    }

    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content)
            .with_context(|| {
                format!(
                    "Failed to parse JSON from config file at {}",
                    config_path.display()
                )
            })?;
        Ok(Self::from_raw(raw_json_config))
    }

    fn from_raw(raw_json_config: RawJsonConfig) -> Self {
        let remote = RemoteSettings {
            region: raw_json_config.region.clone().filter(|s| !s.is_empty()),
            endpoint_url: raw_json_config.endpoint_url.clone().filter(|s| !s.is_empty()),
        };
        AppConfig {
            operation: None, // To be filled by main after parsing CLI args
            remote,
            raw_json_config,
        }
    }
}

pub fn load_list_config(args: &ListArgs) -> Result<ListConfig> {
    if args.container.trim().is_empty() {
        return Err(anyhow::anyhow!("bucket name cannot be empty"));
    }
    Ok(ListConfig {
        container: args.container.clone(),
        prefix: args.prefix.clone(),
        storage_classes: args
            .storage_class
            .iter()
            .map(|class| StorageTier::from(class.as_str()))
            .collect(),
    })
}

pub fn load_restore_config(
    raw_config: &RawJsonConfig,
    args: &RestoreArgs,
) -> Result<RestoreConfig> {
    if args.container.trim().is_empty() {
        return Err(anyhow::anyhow!("bucket name cannot be empty"));
    }

    let jobs = args.jobs.or(raw_config.jobs).unwrap_or(DEFAULT_JOBS);
    if jobs == 0 {
        return Err(anyhow::anyhow!("jobs must be at least 1"));
    }

    let progress_every = args
        .progress_every
        .or(raw_config.progress_every)
        .unwrap_or(DEFAULT_PROGRESS_EVERY);
    if progress_every == 0 {
        return Err(anyhow::anyhow!("progress_every must be at least 1"));
    }

    let timeout_secs = args
        .timeout_secs
        .or(raw_config.call_timeout_secs)
        .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);
    // 0 leaves the bound to the SDK's own client-side defaults.
    let call_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    Ok(RestoreConfig {
        container: args.container.clone(),
        prefix: args.prefix.clone(),
        jobs,
        tier: args.tier.or(raw_config.tier).unwrap_or_default(),
        call_timeout,
        progress_every,
    })
}

pub fn load_copy_config(raw_config: &RawJsonConfig, args: &CopyArgs) -> Result<CopyConfig> {
    if args.container.trim().is_empty() {
        return Err(anyhow::anyhow!("bucket name cannot be empty"));
    }
    let export_dir = args
        .export_dir
        .clone()
        .or_else(|| raw_config.export_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
    Ok(CopyConfig {
        container: args.container.clone(),
        export_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::RetrievalTier;
    use serde_json::json;
    use std::io::Write;

    fn restore_args(container: &str) -> RestoreArgs {
        RestoreArgs {
            container: container.to_string(),
            jobs: None,
            prefix: String::new(),
            tier: None,
            timeout_secs: None,
            progress_every: None,
        }
    }

    #[test]
    fn test_restore_config_defaults() -> anyhow::Result<()> {
        let config = load_restore_config(&RawJsonConfig::default(), &restore_args("bucket"))?;
        assert_eq!(config.jobs, 30);
        assert_eq!(config.tier, TierRequest::Fixed(RetrievalTier::Bulk));
        assert_eq!(config.call_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.progress_every, 100);
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> anyhow::Result<()> {
        let raw: RawJsonConfig = serde_json::from_value(json!({
            "jobs": 10,
            "tier": "fastest",
            "call_timeout_secs": 60
        }))?;
        let mut args = restore_args("bucket");
        args.jobs = Some(4);

        let config = load_restore_config(&raw, &args)?;
        assert_eq!(config.jobs, 4);
        assert_eq!(config.tier, TierRequest::Fastest);
        assert_eq!(config.call_timeout, Some(Duration::from_secs(60)));
        Ok(())
    }

    #[test]
    fn test_zero_timeout_disables_bound() -> anyhow::Result<()> {
        let mut args = restore_args("bucket");
        args.timeout_secs = Some(0);
        let config = load_restore_config(&RawJsonConfig::default(), &args)?;
        assert_eq!(config.call_timeout, None);
        Ok(())
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let mut args = restore_args("bucket");
        args.jobs = Some(0);
        assert!(load_restore_config(&RawJsonConfig::default(), &args).is_err());
    }

    #[test]
    fn test_invalid_tier_in_file_rejected() {
        let result: std::result::Result<RawJsonConfig, _> =
            serde_json::from_value(json!({ "tier": "Glacial" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<RawJsonConfig, _> =
            serde_json::from_value(json!({ "bucket": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_retention_is_not_configurable() {
        let result: std::result::Result<RawJsonConfig, _> =
            serde_json::from_value(json!({ "retention_days": 7 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_json_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{ "region": "eu-west-1", "endpoint_url": "", "export_dir": "out" }}"#
        )?;

        let app_config = AppConfig::load(Some(file.path()))?;
        assert_eq!(app_config.remote.region.as_deref(), Some("eu-west-1"));
        assert_eq!(app_config.remote.endpoint_url, None);

        let copy = load_copy_config(
            &app_config.raw_json_config,
            &CopyArgs {
                container: "bucket".to_string(),
                export_dir: None,
            },
        )?;
        assert_eq!(copy.export_dir, PathBuf::from("out"));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/glacier-restore.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_config_maps_storage_classes() -> anyhow::Result<()> {
        let config = load_list_config(&ListArgs {
            container: "bucket".to_string(),
            prefix: "a/b".to_string(),
            storage_class: vec!["GLACIER".to_string(), "GLACIER_IR".to_string()],
        })?;
        assert_eq!(
            config.storage_classes,
            vec![StorageTier::Glacier, StorageTier::Other("GLACIER_IR".to_string())]
        );
        Ok(())
    }
}
