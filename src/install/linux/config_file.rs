//! Default agent config installation.
//!
//! The config is only ever created. Once an operator has a config file it is
//! theirs; reinstalling never touches it.

use std::path::Path;

use log::info;

use super::StepOutcome;
use super::file_ops::{ensure_dir, remove_if_exists};
use crate::config::APP_NAME;
use crate::error::{InstallerError, IoContext};
use crate::install::Fetcher;

pub(crate) async fn install_config<F: Fetcher>(
    config_dir: &Path,
    url: &str,
    fetcher: &F,
) -> Result<StepOutcome, InstallerError> {
    let config_file = config_dir.join(format!("{APP_NAME}.config.toml"));

    if config_file.is_file() {
        info!("config already exists, skipping...");
        return Ok(StepOutcome::Skipped(format!(
            "{} already exists",
            config_file.display()
        )));
    }

    info!("creating config at {}", config_file.display());
    ensure_dir(config_dir)?;
    fetcher.fetch(url, &config_file).await?;

    // An error page served with 200 must not become the agent's config
    let content = tokio::fs::read_to_string(&config_file)
        .await
        .io_context(|| format!("Failed to read {}", config_file.display()))?;
    if let Err(e) = toml::from_str::<toml::Table>(&content) {
        remove_if_exists(&config_file)?;
        return Err(InstallerError::InvalidConfig {
            path: config_file,
            reason: e.message().to_string(),
        });
    }

    Ok(StepOutcome::Done(format!("wrote {}", config_file.display())))
}
