//! Top-level installer run: detect systemd, resolve, install, report.

use std::io::{IsTerminal, Write};

use log::warn;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::environment::SystemdDetector;
use super::orchestration::Installer;
use super::report::{InstallReport, StepStatus};
use crate::cli::Args;
use crate::config::{APP_NAME, InstallConfig, InstallScope};
use crate::control::Systemctl;
use crate::error::InstallerError;
use crate::install::HttpFetcher;

/// Install periphery as described by `args`.
///
/// Nothing is written to disk unless systemd is usable and `HOME` is set.
pub async fn run_install(args: &Args) -> Result<InstallReport, InstallerError> {
    let color = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color);
    print_banner(&mut stdout);

    ensure_systemd(&SystemdDetector::new(args.force_systemd))?;

    let cfg = InstallConfig::from_env(args)?;
    print_settings(&mut stdout, &cfg);
    warn_if_unprivileged(&cfg);

    let control = Systemctl::new(APP_NAME, cfg.paths.user_install, cfg.timeouts.systemctl);
    let fetcher = HttpFetcher::new(&cfg.timeouts)?;
    let result = Installer::new(&cfg, &control, &fetcher).run().await;

    finish(&mut stdout, &cfg, result)
}

/// Print the outcome of a run. The operator notes are printed whether or not
/// the run was aborted.
fn finish<W: WriteColor>(
    out: &mut W,
    cfg: &InstallConfig,
    result: Result<InstallReport, InstallerError>,
) -> Result<InstallReport, InstallerError> {
    match result {
        Ok(report) => {
            print_report(out, &report);
            print_notes(out, cfg);
            Ok(report)
        }
        Err(e) => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
            let _ = writeln!(out, "\nPeriphery setup aborted: {e}\n");
            let _ = out.reset();
            print_notes(out, cfg);
            Err(e)
        }
    }
}

/// Hard precondition: the installer only knows how to register systemd units.
pub fn ensure_systemd(detector: &SystemdDetector) -> Result<(), InstallerError> {
    if detector.uses_systemd() {
        Ok(())
    } else {
        Err(InstallerError::SystemdUnavailable)
    }
}

fn warn_if_unprivileged(cfg: &InstallConfig) {
    if cfg.scope != InstallScope::User && !nix::unistd::geteuid().is_root() {
        warn!(
            "system-wide install as a non-root user, writing to {} will likely fail (use --user or sudo)",
            cfg.paths.bin_dir.display()
        );
    }
}

fn print_banner<W: WriteColor>(out: &mut W) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(out, "=====================");
    let _ = writeln!(out, " PERIPHERY INSTALLER ");
    let _ = writeln!(out, "=====================");
    let _ = out.reset();
}

fn print_settings<W: WriteColor>(out: &mut W, cfg: &InstallConfig) {
    let paths = &cfg.paths;
    let _ = writeln!(out, "version: {}", cfg.version);
    let _ = writeln!(out, "user install: {}", paths.user_install);
    let _ = writeln!(out, "home dir: {}", paths.home_dir.display());
    let _ = writeln!(out, "bin dir: {}", paths.bin_dir.display());
    let _ = writeln!(out, "config dir: {}", paths.config_dir.display());
    let _ = writeln!(out, "service file dir: {}", paths.unit_dir.display());
    if cfg.force_service_file {
        let _ = writeln!(out, "forcing service file rewrite");
    }
    let _ = writeln!(out);
}

fn print_report<W: WriteColor>(out: &mut W, report: &InstallReport) {
    for entry in &report.entries {
        let (mark, color, msg) = match &entry.status {
            StepStatus::Done(msg) => ("✓", Color::Green, msg),
            StepStatus::Skipped(msg) => ("-", Color::Yellow, msg),
            StepStatus::Failed(msg) => ("✗", Color::Red, msg),
        };
        let _ = out.set_color(ColorSpec::new().set_fg(Some(color)));
        let _ = write!(out, "{mark} {:<13}", entry.step.to_string());
        let _ = out.reset();
        let _ = writeln!(out, "{msg}");
    }

    match report.service_active {
        Some(true) => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
            let _ = writeln!(out, "\n{APP_NAME} is running");
        }
        Some(false) => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            let _ = writeln!(out, "\n{APP_NAME} is not running");
        }
        None => {}
    }
    let _ = out.reset();

    if report.has_failures() {
        let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = writeln!(out, "\nFinished periphery setup with errors, see above.\n");
    } else {
        let _ = out.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(out, "\nFinished periphery setup.\n");
    }
    let _ = out.reset();
}

fn print_notes<W: Write>(out: &mut W, cfg: &InstallConfig) {
    let systemctl = cfg.systemctl_display();
    let _ = writeln!(
        out,
        "Note. Use \"{systemctl} status {APP_NAME}\" to make sure {APP_NAME} is running"
    );
    let _ = writeln!(
        out,
        "Note. Use \"{systemctl} enable {APP_NAME}\" to have {APP_NAME} start on system boot"
    );
}
