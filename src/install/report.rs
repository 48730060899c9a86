//! Per-step results collected by the installer.

use std::fmt;

use crate::error::InstallerError;

/// What a step did when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done(String),
    Skipped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Binary,
    Config,
    ServiceFile,
    Start,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Binary => "binary",
            Step::Config => "config",
            Step::ServiceFile => "service file",
            Step::Start => "start",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct StepEntry {
    pub step: Step,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub entries: Vec<StepEntry>,
    /// `None` when the service was not started or its state couldn't be read
    pub service_active: Option<bool>,
}

impl InstallReport {
    pub(crate) fn push(&mut self, step: Step, result: &Result<StepOutcome, InstallerError>) {
        let status = match result {
            Ok(StepOutcome::Done(msg)) => StepStatus::Done(msg.clone()),
            Ok(StepOutcome::Skipped(msg)) => StepStatus::Skipped(msg.clone()),
            Err(e) => StepStatus::Failed(e.to_string()),
        };
        self.entries.push(StepEntry { step, status });
    }

    pub fn status(&self, step: Step) -> Option<&StepStatus> {
        self.entries
            .iter()
            .find(|e| e.step == step)
            .map(|e| &e.status)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, StepStatus::Failed(_)))
            .map(|e| e.step)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }
}
