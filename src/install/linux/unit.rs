//! Systemd unit file generation and registration.

use std::io;
use std::path::Path;

use log::info;

use super::StepOutcome;
use super::file_ops::{ensure_dir, remove_if_exists, set_mode, write_new_file};
use crate::config::{APP_NAME, InstallPaths};
use crate::control::ServiceControl;
use crate::error::InstallerError;

/// Values substituted into the unit template
pub struct UnitFile<'a> {
    pub home_dir: &'a Path,
    pub bin_dir: &'a Path,
    pub config_dir: &'a Path,
}

impl<'a> UnitFile<'a> {
    pub fn from_paths(paths: &'a InstallPaths) -> Self {
        Self {
            home_dir: &paths.home_dir,
            bin_dir: &paths.bin_dir,
            config_dir: &paths.config_dir,
        }
    }

    /// Render the unit. The agent runs through a login shell so the
    /// operator's profile (PATH, docker env) is available to it.
    pub fn render(&self) -> String {
        let home = self.home_dir.display();
        let binary = self.bin_dir.join(APP_NAME);
        let config = self.config_dir.join(format!("{APP_NAME}.config.toml"));

        format!(
            "[Unit]\n\
             Description=Agent to connect with Komodo Core\n\
             \n\
             [Service]\n\
             Environment=\"HOME={home}\"\n\
             ExecStart=/bin/sh -lc \"{} --config-path {}\"\n\
             Restart=on-failure\n\
             TimeoutStartSec=0\n\
             \n\
             [Install]\n\
             WantedBy=default.target",
            binary.display(),
            config.display(),
        )
    }
}

/// Write `<unit_dir>/periphery.service` unless it exists, then reload systemd.
///
/// With `force` an existing unit is deleted and written again.
pub(crate) async fn install_unit<S: ServiceControl>(
    paths: &InstallPaths,
    force: bool,
    control: &S,
) -> Result<StepOutcome, InstallerError> {
    let unit_path = paths.unit_path();

    let recreated = if unit_path.is_file() {
        if !force {
            info!("service file already exists, skipping...");
            return Ok(StepOutcome::Skipped(format!(
                "{} already exists",
                unit_path.display()
            )));
        }
        info!("deleting existing service file");
        remove_if_exists(&unit_path)?
    } else {
        false
    };

    info!("creating service file at {}", unit_path.display());
    ensure_dir(&paths.unit_dir)?;

    let content = UnitFile::from_paths(paths).render();
    write_new_file(&unit_path, &content).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => InstallerError::UnitExists(unit_path.clone()),
        _ => InstallerError::io(format!("Failed to write {}", unit_path.display()), e),
    })?;
    set_mode(&unit_path, 0o644)?;

    control.daemon_reload().await?;

    let verb = if recreated { "rewrote" } else { "wrote" };
    Ok(StepOutcome::Done(format!("{verb} {}", unit_path.display())))
}
