//! Resolved installer configuration.
//!
//! Command-line flags and `HOME` are read exactly once and folded into an
//! immutable [`InstallConfig`] that every installation step borrows.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::error::InstallerError;
use crate::install::Arch;

pub const APP_NAME: &str = "periphery";
/// Config lives under the Komodo directory, shared with the other Komodo tools.
pub const CONFIG_DIR_NAME: &str = "komodo";

/// "latest" is always served from the x86_64 asset, whatever the host is.
pub const LATEST_BINARY_URL: &str =
    "https://github.com/moghtech/komodo/releases/latest/download/periphery-x86_64";
pub const RELEASE_DOWNLOAD_BASE: &str = "https://github.com/moghtech/komodo/releases/download";
pub const DEFAULT_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/moghtech/komodo/main/config/periphery.config.toml";

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300);
const SYSTEMCTL_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the agent gets installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    /// /usr/local/bin, /etc/komodo, /etc/systemd/system
    System,
    /// ~/.local/bin, ~/.config/komodo, ~/.config/systemd/user
    User,
    /// /usr/bin, /etc/komodo, /usr/lib/systemd/system; lifecycle left to the package
    Distro,
}

impl InstallScope {
    /// Distro packaging manages the service lifecycle itself.
    pub fn starts_service(self) -> bool {
        !matches!(self, InstallScope::Distro)
    }
}

/// Behaviour when an installation step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// Log the failure and carry on with the remaining steps
    Continue,
    /// Stop at the first failed step and exit non-zero
    Abort,
}

/// The directories one installation writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub user_install: bool,
    pub home_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub config_dir: PathBuf,
    pub unit_dir: PathBuf,
}

impl InstallPaths {
    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir.join(APP_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(format!("{APP_NAME}.config.toml"))
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{APP_NAME}.service"))
    }
}

/// Map an install scope and home directory to the install layout.
pub fn resolve_paths(scope: InstallScope, home_dir: &Path) -> InstallPaths {
    let etc = PathBuf::from("/etc").join(CONFIG_DIR_NAME);
    match scope {
        InstallScope::Distro => InstallPaths {
            user_install: false,
            home_dir: home_dir.to_path_buf(),
            bin_dir: PathBuf::from("/usr/bin"),
            config_dir: etc,
            unit_dir: PathBuf::from("/usr/lib/systemd/system"),
        },
        InstallScope::User => InstallPaths {
            user_install: true,
            home_dir: home_dir.to_path_buf(),
            bin_dir: home_dir.join(".local/bin"),
            config_dir: home_dir.join(".config").join(CONFIG_DIR_NAME),
            unit_dir: home_dir.join(".config/systemd/user"),
        },
        InstallScope::System => InstallPaths {
            user_install: false,
            home_dir: home_dir.to_path_buf(),
            bin_dir: PathBuf::from("/usr/local/bin"),
            config_dir: etc,
            unit_dir: PathBuf::from("/etc/systemd/system"),
        },
    }
}

/// Remote locations the installer downloads from.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub latest_binary_url: String,
    pub release_download_base: String,
    pub default_config_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            latest_binary_url: LATEST_BINARY_URL.to_string(),
            release_download_base: RELEASE_DOWNLOAD_BASE.to_string(),
            default_config_url: DEFAULT_CONFIG_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub inactivity: Duration,
    pub systemctl: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DOWNLOAD_CONNECT_TIMEOUT,
            inactivity: DOWNLOAD_INACTIVITY_TIMEOUT,
            systemctl: SYSTEMCTL_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub version: String,
    pub scope: InstallScope,
    pub paths: InstallPaths,
    pub arch: Arch,
    pub force_service_file: bool,
    pub error_policy: ErrorPolicy,
    pub endpoints: Endpoints,
    pub timeouts: Timeouts,
}

impl InstallConfig {
    /// Resolve the configuration from parsed flags and the process environment.
    pub fn from_env(args: &Args) -> Result<Self, InstallerError> {
        let home_dir = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(InstallerError::HomeNotSet)?;
        Ok(Self::new(args, &home_dir, Arch::detect()))
    }

    pub fn new(args: &Args, home_dir: &Path, arch: Arch) -> Self {
        let scope = args.scope();
        Self {
            version: args.version.clone(),
            scope,
            paths: resolve_paths(scope, home_dir),
            arch,
            force_service_file: args.force_service_file,
            error_policy: args.on_error,
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn is_latest(&self) -> bool {
        self.version == "latest"
    }

    /// Release asset URL for the configured version.
    ///
    /// `latest` resolves to the fixed x86_64 asset regardless of `arch`.
    pub fn binary_url(&self) -> String {
        if self.is_latest() {
            self.endpoints.latest_binary_url.clone()
        } else {
            format!(
                "{}/{}/{}",
                self.endpoints.release_download_base,
                self.version,
                self.arch.artifact_name()
            )
        }
    }

    /// `systemctl` or `systemctl --user`, for operator-facing hints.
    pub fn systemctl_display(&self) -> &'static str {
        if self.paths.user_install {
            "systemctl --user"
        } else {
            "systemctl"
        }
    }
}
