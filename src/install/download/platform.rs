//! Host architecture detection for release artifact selection

use log::{info, warn};
use once_cell::sync::OnceCell;

/// CPU architectures periphery is released for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

/// Global cache for arch detection (initialized once, used everywhere)
static ARCH_CACHE: OnceCell<Arch> = OnceCell::new();

impl Arch {
    /// Detect the host architecture (cached after first call)
    pub fn detect() -> Self {
        *ARCH_CACHE.get_or_init(|| {
            let arch = Self::from_machine(&host_machine());
            match arch {
                Arch::Aarch64 => info!("aarch64 detected"),
                Arch::X86_64 => info!("using x86_64 binary"),
            }
            arch
        })
    }

    /// Map a `uname -m` style machine string. Anything that isn't ARM64 gets
    /// the x86_64 artifact.
    pub fn from_machine(machine: &str) -> Self {
        match machine.trim().to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => Arch::Aarch64,
            _ => Arch::X86_64,
        }
    }

    /// Release asset name for this architecture
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Arch::X86_64 => "periphery-x86_64",
            Arch::Aarch64 => "periphery-aarch64",
        }
    }
}

/// Runtime machine name; falls back to the compile target when uname fails.
fn host_machine() -> String {
    match nix::sys::utsname::uname() {
        Ok(uts) => uts.machine().to_string_lossy().into_owned(),
        Err(e) => {
            warn!("uname failed ({e}), assuming {}", std::env::consts::ARCH);
            std::env::consts::ARCH.to_string()
        }
    }
}
