//! Installer error type.
//!
//! Every step of the installation returns `Result<_, InstallerError>` so the
//! driver can decide, per `ErrorPolicy`, whether to keep going or stop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("This installer requires systemd and systemd wasn't found. Exiting")]
    SystemdUnavailable,

    #[error("HOME environment variable not set")]
    HomeNotSet,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Invalid config at {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("systemctl {action} failed: {reason}")]
    ServiceControl { action: String, reason: String },

    #[error("Service file {} already exists", .0.display())]
    UnitExists(PathBuf),
}

impl InstallerError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn download(url: &str, reason: impl ToString) -> Self {
        Self::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Attach a message to an `io::Result`, the way `anyhow::Context` does.
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T, InstallerError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T, InstallerError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| InstallerError::io(f(), e))
    }
}
