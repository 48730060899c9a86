use clap::Parser;

use crate::config::{ErrorPolicy, InstallScope};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "setup-periphery",
    about = "Install the Komodo periphery agent as a systemd service",
    disable_version_flag = true
)]
pub struct Args {
    /// Release to install, e.g. v1.2.3
    #[arg(long, value_name = "X", default_value = "latest")]
    pub version: String,

    /// Skip the systemd detection and assume it is available
    #[arg(long)]
    pub force_systemd: bool,

    /// Install into distro package paths (/usr/bin, /usr/lib/systemd/system) and don't start the service
    #[arg(long)]
    pub distro_install: bool,

    /// Install for the current user (~/.local/bin, ~/.config, systemctl --user)
    #[arg(long)]
    pub user: bool,

    /// Delete and rewrite the service file even if it already exists
    #[arg(long)]
    pub force_service_file: bool,

    /// What to do when an installation step fails
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Continue)]
    pub on_error: ErrorPolicy,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Distro mode wins over user mode; neither means system-wide.
    pub fn scope(&self) -> InstallScope {
        if self.distro_install {
            InstallScope::Distro
        } else if self.user {
            InstallScope::User
        } else {
            InstallScope::System
        }
    }
}
