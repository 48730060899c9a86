//! Periphery installation
//!
//! Sequential orchestration of the install steps on a systemd host:
//! detect systemd, stop the agent, replace its binary, create the default
//! config when missing, write the unit file when missing, then start it.

mod download;
mod environment;
mod linux;
mod orchestration;
mod report;
mod runners;

#[cfg(test)]
mod testing;

// Public exports
pub use download::{Arch, Fetcher, HttpFetcher};
pub use environment::{SYSTEMD_RUNTIME_DIR, SystemdDetector};
pub use linux::UnitFile;
pub use orchestration::Installer;
pub use report::{InstallReport, Step, StepEntry, StepOutcome, StepStatus};
pub use runners::{ensure_systemd, run_install};
