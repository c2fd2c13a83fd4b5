//! Per-script outcomes and the batch summary.

use crate::error::{ExitCode, RouteError};
use crate::output;

/// What happened to one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Ran (or tried to parse its arguments) and failed.
    Failed { reason: String },
    /// Never started because routing failed for the whole batch.
    NotRun,
}

/// Result from executing a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub script_name: String,
    pub outcome: Outcome,
    pub exit_code: i32,
}

impl ExecutionResult {
    pub fn passed(script_name: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            outcome: Outcome::Passed,
            exit_code: ExitCode::SUCCESS,
        }
    }

    pub fn failed(script_name: impl Into<String>, exit_code: i32, reason: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            outcome: Outcome::Failed {
                reason: reason.into(),
            },
            exit_code,
        }
    }

    pub fn not_run(script_name: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            outcome: Outcome::NotRun,
            exit_code: ExitCode::USAGE_ERROR,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { reason } => Some(reason),
            Outcome::Passed | Outcome::NotRun => None,
        }
    }
}

/// Aggregated results from a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResults {
    pub results: Vec<ExecutionResult>,
    /// Set when routing failed and nothing ran.
    pub routing_error: Option<RouteError>,
}

impl BatchResults {
    /// A batch where routing failed: every target is marked not run.
    pub fn aborted<S: AsRef<str>>(scripts: &[S], error: RouteError) -> Self {
        Self {
            results: scripts
                .iter()
                .map(|name| ExecutionResult::not_run(name.as_ref()))
                .collect(),
            routing_error: Some(error),
        }
    }

    pub fn all_success(&self) -> bool {
        self.routing_error.is_none() && self.results.iter().all(ExecutionResult::success)
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count()
    }

    pub fn not_run_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::NotRun)
            .count()
    }

    /// Process exit code for the whole batch.
    pub fn exit_code(&self) -> i32 {
        if self.routing_error.is_some() {
            ExitCode::USAGE_ERROR
        } else if self.all_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::ERROR
        }
    }

    /// Human-readable report, one line per script.
    pub fn summary(&self) -> String {
        let total = self.results.len();
        let mut lines = Vec::with_capacity(total + 1);

        match &self.routing_error {
            Some(err) => lines.push(format!(
                "Routing failed: {}; 0 of {} script(s) executed",
                err, total
            )),
            None => lines.push(format!(
                "Executed {} script(s): {} passed, {} failed",
                total,
                self.success_count(),
                self.failed_count()
            )),
        }

        for result in &self.results {
            let line = match &result.outcome {
                Outcome::Passed => output::success(&result.script_name),
                Outcome::Failed { reason } => {
                    output::error(&format!("{}: {}", result.script_name, reason))
                }
                Outcome::NotRun => output::skipped(&format!("{}: not run", result.script_name)),
            };
            lines.push(format!("  {}", line));
        }

        lines.join("\n")
    }
}
