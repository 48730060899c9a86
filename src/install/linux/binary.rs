//! Agent binary installation.

use log::{debug, info, warn};

use super::StepOutcome;
use super::file_ops::{ensure_dir, remove_if_exists, set_mode};
use crate::config::InstallConfig;
use crate::control::ServiceControl;
use crate::error::InstallerError;
use crate::install::{Arch, Fetcher};

/// Replace `<bin_dir>/periphery` with the release artifact for this host.
pub(crate) async fn install_binary<S, F>(
    cfg: &InstallConfig,
    control: &S,
    fetcher: &F,
) -> Result<StepOutcome, InstallerError>
where
    S: ServiceControl,
    F: Fetcher,
{
    // The unit may not exist yet on a fresh host
    if let Err(e) = control.stop().await {
        debug!("stop before install ignored: {e}");
    }

    ensure_dir(&cfg.paths.bin_dir)?;

    let bin_path = cfg.paths.binary_path();
    if remove_if_exists(&bin_path)? {
        debug!("removed previous binary at {}", bin_path.display());
    }

    if cfg.is_latest() && cfg.arch == Arch::Aarch64 {
        warn!(
            "latest release always resolves to the x86_64 binary; pass --version=<tag> to get {}",
            Arch::Aarch64.artifact_name()
        );
    }

    let url = cfg.binary_url();
    info!("downloading {url}");
    let bytes = fetcher.fetch(&url, &bin_path).await?;

    set_mode(&bin_path, 0o755)?;

    Ok(StepOutcome::Done(format!(
        "installed {} ({bytes} bytes)",
        bin_path.display()
    )))
}
