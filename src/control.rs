//! Service lifecycle control - delegates to systemd (systemctl)
//!
//! The installer only ever talks to the service manager through
//! [`ServiceControl`], so the installation steps can be exercised without a
//! running systemd.

use crate::error::InstallerError;

mod linux_control;

pub use linux_control::Systemctl;

#[allow(async_fn_in_trait)]
pub trait ServiceControl {
    /// Stop the service
    async fn stop(&self) -> Result<(), InstallerError>;

    /// Start the service
    async fn start(&self) -> Result<(), InstallerError>;

    /// Reload unit files so a freshly written unit is picked up
    async fn daemon_reload(&self) -> Result<(), InstallerError>;

    /// Returns: Ok(true) if running, Ok(false) if not
    async fn is_active(&self) -> Result<bool, InstallerError>;
}
