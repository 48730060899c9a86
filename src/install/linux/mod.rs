//! Installation steps for systemd hosts.
//!
//! - `binary` - stop, replace and chmod the agent binary
//! - `config_file` - fetch the default config when none exists
//! - `unit` - unit file generation and daemon-reload
//! - `file_ops` - filesystem helpers

mod binary;
mod config_file;
mod file_ops;
mod unit;

use super::report::StepOutcome;

pub(crate) use binary::install_binary;
pub(crate) use config_file::install_config;
pub(crate) use unit::install_unit;
pub use unit::UnitFile;
