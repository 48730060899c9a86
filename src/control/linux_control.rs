//! Linux service control using systemd (systemctl)

use std::process::{Output, Stdio};
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use super::ServiceControl;
use crate::error::InstallerError;

/// `systemctl [--user] <action> <service>.service`
#[derive(Debug, Clone)]
pub struct Systemctl {
    user: bool,
    service_name: String,
    timeout: Duration,
}

impl Systemctl {
    pub fn new(service_name: &str, user: bool, timeout: Duration) -> Self {
        Self {
            user,
            service_name: format!("{service_name}.service"),
            timeout,
        }
    }

    fn args<'a>(&'a self, action: &'a str, with_unit: bool) -> Vec<&'a str> {
        let mut args = Vec::with_capacity(3);
        if self.user {
            args.push("--user");
        }
        args.push(action);
        if with_unit {
            args.push(self.service_name.as_str());
        }
        args
    }

    /// Run systemctl, killing it if it outlives the timeout
    async fn run(&self, action: &str, with_unit: bool) -> Result<Output, InstallerError> {
        let args = self.args(action, with_unit);
        debug!("systemctl {}", args.join(" "));

        let mut cmd = Command::new("systemctl");
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(InstallerError::ServiceControl {
                action: action.to_string(),
                reason: format!("failed to execute systemctl: {e}"),
            }),
            Err(_) => Err(InstallerError::ServiceControl {
                action: action.to_string(),
                reason: format!("timed out after {}s", self.timeout.as_secs()),
            }),
        }
    }

    async fn run_checked(&self, action: &str, with_unit: bool) -> Result<(), InstallerError> {
        let output = self.run(action, with_unit).await?;
        if !output.status.success() {
            return Err(InstallerError::ServiceControl {
                action: action.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl ServiceControl for Systemctl {
    async fn stop(&self) -> Result<(), InstallerError> {
        self.run_checked("stop", true).await
    }

    async fn start(&self) -> Result<(), InstallerError> {
        self.run_checked("start", true).await
    }

    async fn daemon_reload(&self) -> Result<(), InstallerError> {
        self.run_checked("daemon-reload", false).await
    }

    async fn is_active(&self) -> Result<bool, InstallerError> {
        // Exit 0 if active, 3 if inactive, other codes for other states
        let output = self.run("is-active", true).await?;
        Ok(output.status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_args() {
        let ctl = Systemctl::new("periphery", false, Duration::from_secs(1));
        assert_eq!(ctl.args("stop", true), ["stop", "periphery.service"]);
        assert_eq!(ctl.args("daemon-reload", false), ["daemon-reload"]);
    }

    #[test]
    fn user_args() {
        let ctl = Systemctl::new("periphery", true, Duration::from_secs(1));
        assert_eq!(ctl.args("start", true), ["--user", "start", "periphery.service"]);
        assert_eq!(ctl.args("daemon-reload", false), ["--user", "daemon-reload"]);
    }
}
