//! Installation step sequencing
//!
//! binary → config → service file → start (unless distro) → status.
//! Each step's result is recorded; `ErrorPolicy` decides whether a failure
//! ends the run or is only logged.

use log::{error, info, warn};

use super::linux::{install_binary, install_config, install_unit};
use super::report::{InstallReport, Step, StepOutcome};
use crate::config::{APP_NAME, ErrorPolicy, InstallConfig};
use crate::control::ServiceControl;
use crate::error::InstallerError;
use crate::install::Fetcher;

pub struct Installer<'a, S, F> {
    cfg: &'a InstallConfig,
    control: &'a S,
    fetcher: &'a F,
}

impl<'a, S, F> Installer<'a, S, F>
where
    S: ServiceControl,
    F: Fetcher,
{
    pub fn new(cfg: &'a InstallConfig, control: &'a S, fetcher: &'a F) -> Self {
        Self {
            cfg,
            control,
            fetcher,
        }
    }

    /// Run every step in order.
    ///
    /// Under `ErrorPolicy::Abort` the first failure is returned; under
    /// `Continue` failures only show up in the report.
    pub async fn run(&self) -> Result<InstallReport, InstallerError> {
        let cfg = self.cfg;
        let mut report = InstallReport::default();

        let result = install_binary(cfg, self.control, self.fetcher).await;
        self.record(&mut report, Step::Binary, result)?;

        let result = install_config(
            &cfg.paths.config_dir,
            &cfg.endpoints.default_config_url,
            self.fetcher,
        )
        .await;
        self.record(&mut report, Step::Config, result)?;

        let result = install_unit(&cfg.paths, cfg.force_service_file, self.control).await;
        self.record(&mut report, Step::ServiceFile, result)?;

        if cfg.scope.starts_service() {
            info!("starting {APP_NAME}...");
            let result = self
                .control
                .start()
                .await
                .map(|()| StepOutcome::Done(format!("started {APP_NAME}")));
            self.record(&mut report, Step::Start, result)?;

            report.service_active = match self.control.is_active().await {
                Ok(active) => Some(active),
                Err(e) => {
                    warn!("could not query {APP_NAME} status: {e}");
                    None
                }
            };
        }

        Ok(report)
    }

    fn record(
        &self,
        report: &mut InstallReport,
        step: Step,
        result: Result<StepOutcome, InstallerError>,
    ) -> Result<(), InstallerError> {
        report.push(step, &result);
        match result {
            Ok(_) => Ok(()),
            Err(e) => match self.cfg.error_policy {
                ErrorPolicy::Abort => Err(e),
                ErrorPolicy::Continue => {
                    error!("{step} step failed, continuing: {e}");
                    Ok(())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::install::Arch;
    use crate::install::report::StepStatus;
    use crate::install::testing::{FakeControl, FakeFetcher, config_in};

    const TEMPLATE: &str = "port = 8120\n";

    #[tokio::test]
    async fn fresh_system_install() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path(), &[], Arch::X86_64);
        let control = FakeControl::default();
        let fetcher = FakeFetcher::new(TEMPLATE);

        let report = Installer::new(&cfg, &control, &fetcher).run().await.unwrap();

        assert!(root.path().join("usr/local/bin/periphery").is_file());
        assert!(root.path().join("etc/komodo/periphery.config.toml").is_file());
        assert!(root.path().join("etc/systemd/system/periphery.service").is_file());
        assert_eq!(control.calls(), ["stop", "daemon-reload", "start", "is-active"]);
        assert_eq!(
            fetcher.urls(),
            [
                crate::config::LATEST_BINARY_URL,
                crate::config::DEFAULT_CONFIG_URL
            ]
        );
        assert!(!report.has_failures());
        assert_eq!(report.service_active, Some(true));
    }

    #[tokio::test]
    async fn distro_install_is_not_started() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path(), &["--distro-install"], Arch::X86_64);
        let control = FakeControl::default();

        let report = Installer::new(&cfg, &control, &FakeFetcher::new(TEMPLATE))
            .run()
            .await
            .unwrap();

        assert!(root.path().join("usr/bin/periphery").is_file());
        assert!(root.path().join("usr/lib/systemd/system/periphery.service").is_file());
        assert_eq!(control.calls(), ["stop", "daemon-reload"]);
        assert!(report.status(Step::Start).is_none());
        assert_eq!(report.service_active, None);
    }

    #[tokio::test]
    async fn continue_policy_runs_every_step() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path(), &[], Arch::X86_64);
        let control = FakeControl::default();
        let fetcher = FakeFetcher::unreachable();

        let report = Installer::new(&cfg, &control, &fetcher).run().await.unwrap();

        let failed: Vec<_> = report.failed_steps().collect();
        assert_eq!(failed, [Step::Binary, Step::Config]);
        assert!(cfg.paths.unit_path().is_file());
        assert!(matches!(report.status(Step::Start), Some(StepStatus::Done(_))));
    }

    #[tokio::test]
    async fn abort_policy_stops_at_first_failure() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path(), &["--on-error", "abort"], Arch::X86_64);
        let control = FakeControl::default();
        let fetcher = FakeFetcher::unreachable();

        let err = Installer::new(&cfg, &control, &fetcher).run().await.unwrap_err();

        assert!(matches!(err, InstallerError::Download { .. }));
        assert_eq!(fetcher.urls().len(), 1);
        assert!(!cfg.paths.config_dir.exists());
        assert!(!cfg.paths.unit_path().exists());
        assert_eq!(control.calls(), ["stop"]);
    }

    #[tokio::test]
    async fn rerun_keeps_config_and_unit() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config_in(root.path(), &["--user"], Arch::X86_64);
        let control = FakeControl::inactive();
        let fetcher = FakeFetcher::new(TEMPLATE);

        Installer::new(&cfg, &control, &fetcher).run().await.unwrap();
        fs::write(cfg.paths.config_path(), "port = 9000\n").unwrap();
        let report = Installer::new(&cfg, &control, &fetcher).run().await.unwrap();

        assert!(matches!(report.status(Step::Config), Some(StepStatus::Skipped(_))));
        assert!(matches!(report.status(Step::ServiceFile), Some(StepStatus::Skipped(_))));
        assert_eq!(fs::read_to_string(cfg.paths.config_path()).unwrap(), "port = 9000\n");
        // binary fetched twice, config once
        assert_eq!(fetcher.urls().len(), 3);
        assert_eq!(report.service_active, Some(false));
    }
}
