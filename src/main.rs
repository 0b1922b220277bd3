//! Glacier bulk-restore tool
//!
//! Lists archived objects by storage class, requests their restoration in
//! bulk and generates copy commands for objects that are already restored.

// glacier-restore/src/main.rs
mod cli;
mod config;
mod copy;
mod errors;
mod listing;
mod restore;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use config::{
    AppConfig, OperationConfig, load_copy_config, load_list_config, load_restore_config,
};
use std::process::ExitCode;
use std::sync::Arc;
use storage::s3::S3Store;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when a restore batch finished but some keys failed.
const EXIT_PARTIAL_FAILURE: u8 = 2;

enum RunStatus {
    Clean,
    PartialFailure,
}

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; credentials usually come from the ambient AWS chain.
    let _ = dotenv::dotenv();
    init_tracing();

    let args = cli::Args::parse();
    match run_app(args).await {
        Ok(RunStatus::Clean) => ExitCode::SUCCESS,
        Ok(RunStatus::PartialFailure) => ExitCode::from(EXIT_PARTIAL_FAILURE),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the command output, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_app(args: cli::Args) -> Result<RunStatus> {
    let mut app_config = AppConfig::load(args.config.as_deref())
        .context("Failed to load application configuration")?;

    info!(
        "{} started, pid: {}",
        env!("CARGO_PKG_NAME"),
        std::process::id()
    );

    match args.command {
        cli::Command::List(list_args) => {
            let list_config = load_list_config(&list_args).context("Invalid list arguments")?;
            app_config.operation = Some(OperationConfig::List(list_config));
            let store = S3Store::connect(&app_config.remote).await;
            listing::run_list_flow(&app_config, &store)
                .await
                .context("List process failed")?;
            Ok(RunStatus::Clean)
        }
        cli::Command::Restore(restore_args) => {
            let restore_config = load_restore_config(&app_config.raw_json_config, &restore_args)
                .context("Invalid restore arguments")?;
            app_config.operation = Some(OperationConfig::Restore(restore_config));
            let store = Arc::new(S3Store::connect(&app_config.remote).await);
            let report = restore::run_restore_flow(&app_config, store)
                .await
                .context("Restore process failed")?;
            if report.has_failures() {
                warn!(
                    failed = report.failures.len(),
                    total = report.total_submitted,
                    "some restore requests failed"
                );
                Ok(RunStatus::PartialFailure)
            } else {
                Ok(RunStatus::Clean)
            }
        }
        cli::Command::GenCopyCommands(copy_args) => {
            let copy_config = load_copy_config(&app_config.raw_json_config, &copy_args)
                .context("Invalid gen-copy-commands arguments")?;
            app_config.operation = Some(OperationConfig::CopyCommands(copy_config));
            copy::run_copy_flow(&app_config)
                .await
                .context("Copy command generation failed")?;
            Ok(RunStatus::Clean)
        }
    }
}
