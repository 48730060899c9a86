//! Installer for the Komodo periphery agent.
//!
//! Downloads the agent binary for the host architecture, drops a default
//! config next to it and registers a systemd unit, for system-wide, per-user
//! or distro package layouts.

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod install;

pub use config::{InstallConfig, InstallPaths, InstallScope, resolve_paths};
pub use error::InstallerError;
