//! Pipeline host channels
//!
//! [`TaskHost`] is everything the task needs from the pipeline: four log
//! channels and a single terminal outcome. [`AzurePipelinesHost`] speaks the
//! agent's `##vso[...]` logging-command protocol on stdout; [`ConsoleHost`]
//! prints colored lines for local runs.

use colored::*;
use std::fmt;
use std::io::{self, Write};
use tracing::warn;

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded(String),
    Failed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded(_))
    }

    pub fn message(&self) -> &str {
        match self {
            TaskOutcome::Succeeded(message) | TaskOutcome::Failed(message) => message,
        }
    }

    /// Result name used by the logging-command protocol
    pub fn result_name(&self) -> &'static str {
        match self {
            TaskOutcome::Succeeded(_) => "Succeeded",
            TaskOutcome::Failed(_) => "Failed",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.result_name(), self.message())
    }
}

/// Log channels and outcome setter exposed by the pipeline
pub trait TaskHost {
    fn error(&mut self, message: &str);
    fn warning(&mut self, message: &str);

    /// Plain standard output
    fn info(&mut self, message: &str);

    fn debug(&mut self, message: &str);

    /// Called exactly once per run, as the last action
    fn set_result(&mut self, outcome: &TaskOutcome);
}

/// Escape message data for a logging command
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Writes Azure Pipelines logging commands
pub struct AzurePipelinesHost<W: Write> {
    out: W,
}

impl AzurePipelinesHost<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> AzurePipelinesHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(error = %e, "failed to write to pipeline log");
        }
    }
}

impl<W: Write> TaskHost for AzurePipelinesHost<W> {
    fn error(&mut self, message: &str) {
        self.emit(&format!("##vso[task.logissue type=error]{}", escape_data(message)));
    }

    fn warning(&mut self, message: &str) {
        self.emit(&format!(
            "##vso[task.logissue type=warning]{}",
            escape_data(message)
        ));
    }

    fn info(&mut self, message: &str) {
        self.emit(message);
    }

    fn debug(&mut self, message: &str) {
        self.emit(&format!("##vso[task.debug]{}", escape_data(message)));
    }

    fn set_result(&mut self, outcome: &TaskOutcome) {
        self.emit(&format!(
            "##vso[task.complete result={};]{}",
            outcome.result_name(),
            escape_data(outcome.message())
        ));
    }
}

/// Human-readable output for running outside a pipeline
pub struct ConsoleHost<W: Write> {
    out: W,
    verbose: bool,
}

impl ConsoleHost<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self {
            out: io::stdout(),
            verbose,
        }
    }
}

impl<W: Write> ConsoleHost<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: String) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(error = %e, "failed to write to console");
        }
    }
}

impl<W: Write> TaskHost for ConsoleHost<W> {
    fn error(&mut self, message: &str) {
        self.emit(format!("{} {}", "✗".red(), message.red()));
    }

    fn warning(&mut self, message: &str) {
        self.emit(format!("{} {}", "!".yellow(), message.yellow()));
    }

    fn info(&mut self, message: &str) {
        self.emit(format!("{} {}", "→".cyan(), message));
    }

    fn debug(&mut self, message: &str) {
        if self.verbose {
            self.emit(format!("  {}", message.dimmed()));
        }
    }

    fn set_result(&mut self, outcome: &TaskOutcome) {
        let line = match outcome {
            TaskOutcome::Succeeded(message) => {
                format!("\n{} {}", "✓ Succeeded:".green().bold(), message)
            }
            TaskOutcome::Failed(message) => {
                format!("\n{} {}", "✗ Failed:".red().bold(), message)
            }
        };
        self.emit(line);
    }
}
