// glacier-restore/src/restore/report.rs
use std::io::Write;

use tracing::warn;

use crate::errors::RestoreError;

/// Aggregate result of one restore batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_submitted: usize,
    pub completed_count: usize,
    pub succeeded: usize,
    /// In the order the failures were observed.
    pub failures: Vec<(String, RestoreError)>,
}

impl BatchReport {
    pub fn new(total_submitted: usize) -> Self {
        Self {
            total_submitted,
            ..Default::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Sink for batch progress. Called from the single coordinating task only.
pub trait BatchReporter {
    fn on_start(&mut self, total: usize);
    fn on_progress(&mut self, completed: usize);
    fn on_success(&mut self, _key: &str) {}
    fn on_failure(&mut self, key: &str, error: &RestoreError);
    fn on_finish(&mut self, report: &BatchReport);
}

/// Prints the batch the way the `restore` command promises: the total first,
/// a running count every N completions, one `Error:` line per failure as soon
/// as it happens, and a closing tally.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        let written = self
            .out
            .write_fmt(line)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            warn!("failed to write batch progress: {}", e);
        }
    }
}

impl<W: Write> BatchReporter for ConsoleReporter<W> {
    fn on_start(&mut self, total: usize) {
        self.emit(format_args!("{}", total));
    }

    fn on_progress(&mut self, completed: usize) {
        self.emit(format_args!("{}", completed));
    }

    fn on_failure(&mut self, key: &str, error: &RestoreError) {
        self.emit(format_args!("Error: {} {}", key, error));
    }

    fn on_finish(&mut self, report: &BatchReport) {
        self.emit(format_args!(
            "Completed {} of {}: {} succeeded, {} failed",
            report.completed_count,
            report.total_submitted,
            report.succeeded,
            report.failures.len()
        ));
    }
}
