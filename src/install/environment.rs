//! Service manager detection
//!
//! The installer only supports systemd. It is considered usable when the
//! operator forces it, or when `systemctl` is on `PATH` and systemd is the
//! running init system (its runtime directory exists).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::debug;

pub const SYSTEMCTL: &str = "systemctl";
pub const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system/";

#[derive(Debug, Clone)]
pub struct SystemdDetector {
    force: bool,
    search_path: Option<OsString>,
    runtime_dir: PathBuf,
}

impl SystemdDetector {
    /// Check against the real `PATH` and `/run/systemd/system/`
    pub fn new(force: bool) -> Self {
        Self {
            force,
            search_path: std::env::var_os("PATH"),
            runtime_dir: PathBuf::from(SYSTEMD_RUNTIME_DIR),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = dir.into();
        self
    }

    /// Side-effect free check that systemd can manage the service
    pub fn uses_systemd(&self) -> bool {
        if self.force {
            debug!("systemd detection skipped (--force-systemd)");
            return true;
        }

        let Some(search_path) = self.search_path.as_ref() else {
            debug!("PATH not set, cannot locate {SYSTEMCTL}");
            return false;
        };
        let systemctl = which::which_in(SYSTEMCTL, Some(search_path), Path::new("/"));
        let running = self.runtime_dir.is_dir();
        debug!(
            "systemctl: {:?}, {} present: {running}",
            systemctl.as_ref().ok(),
            self.runtime_dir.display()
        );

        systemctl.is_ok() && running
    }
}
