//! Recording fakes for the service manager and HTTP seams.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::Args;
use crate::config::InstallConfig;
use crate::control::ServiceControl;
use crate::error::{InstallerError, IoContext};
use crate::install::{Arch, Fetcher};

#[derive(Default)]
pub(crate) struct FakeControl {
    calls: RefCell<Vec<String>>,
    failing: Option<&'static str>,
    inactive: bool,
}

impl FakeControl {
    /// Every call to `action` fails
    pub(crate) fn failing(action: &'static str) -> Self {
        Self {
            failing: Some(action),
            ..Self::default()
        }
    }

    pub(crate) fn inactive() -> Self {
        Self {
            inactive: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, action: &str) -> Result<(), InstallerError> {
        self.calls.borrow_mut().push(action.to_string());
        if self.failing == Some(action) {
            return Err(InstallerError::ServiceControl {
                action: action.to_string(),
                reason: "Unit periphery.service not loaded.".to_string(),
            });
        }
        Ok(())
    }
}

impl ServiceControl for FakeControl {
    async fn stop(&self) -> Result<(), InstallerError> {
        self.record("stop")
    }

    async fn start(&self) -> Result<(), InstallerError> {
        self.record("start")
    }

    async fn daemon_reload(&self) -> Result<(), InstallerError> {
        self.record("daemon-reload")
    }

    async fn is_active(&self) -> Result<bool, InstallerError> {
        self.record("is-active")?;
        Ok(!self.inactive)
    }
}

/// Serves the same body for every URL, or fails every request
pub(crate) struct FakeFetcher {
    body: Option<String>,
    urls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            urls: RefCell::default(),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            body: None,
            urls: RefCell::default(),
        }
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, InstallerError> {
        self.urls.borrow_mut().push(url.to_string());
        let Some(body) = &self.body else {
            return Err(InstallerError::download(url, "connection refused"));
        };
        std::fs::write(dest, body).io_context(|| format!("write {}", dest.display()))?;
        Ok(body.len() as u64)
    }
}

/// Resolve `flags` as usual, then move every install directory under `root`.
pub(crate) fn config_in(root: &Path, flags: &[&str], arch: Arch) -> InstallConfig {
    let mut argv = vec!["setup-periphery"];
    argv.extend_from_slice(flags);
    let args = Args::try_parse_from(argv).unwrap();
    let home = root.join("home/op");
    let mut cfg = InstallConfig::new(&args, &home, arch);

    let reroot = |p: &PathBuf| -> PathBuf {
        if p.starts_with(root) {
            p.clone()
        } else {
            root.join(p.strip_prefix("/").unwrap())
        }
    };
    cfg.paths.bin_dir = reroot(&cfg.paths.bin_dir);
    cfg.paths.config_dir = reroot(&cfg.paths.config_dir);
    cfg.paths.unit_dir = reroot(&cfg.paths.unit_dir);
    cfg
}
