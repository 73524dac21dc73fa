//! Host OS and CPU architecture detection

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::command_output;

/// Canonical x86 architecture identifier.
pub const ARCH_X86_64: &str = "x86_64";

/// Canonical ARM architecture identifier.
pub const ARCH_ARM64: &str = "arm64";

/// Environment variable naming the exact ARM variant string to build
/// for (e.g. `arm64e`). Defaults to [`ARCH_ARM64`] when unset.
pub const ARM_ARCH_ENV: &str = "MACOS_ARM_ARCHITECTURE";

/// Operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Detect the current operating system at compile time
    #[cfg(target_os = "linux")]
    pub const fn current() -> Self {
        Os::Linux
    }

    #[cfg(target_os = "macos")]
    pub const fn current() -> Self {
        Os::Darwin
    }

    #[cfg(target_os = "windows")]
    pub const fn current() -> Self {
        Os::Windows
    }

    /// Returns the OS name as used in platform strings
    pub const fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }

    /// macOS gates every universal-binary and code-signing operation
    pub const fn is_macos(&self) -> bool {
        matches!(self, Os::Darwin)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the ARM architecture identifier to build for.
///
/// Honors the `MACOS_ARM_ARCHITECTURE` override when set and
/// non-empty, otherwise the canonical `arm64`.
pub fn target_arm_arch() -> String {
    env::var(ARM_ARCH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| ARCH_ARM64.to_string())
}

/// Probe the host CPU architecture via the `arch` command.
///
/// `i386` and `x86_64` both map to the x86 identifier. Anything else,
/// including a missing or failing `arch` binary, resolves to
/// [`target_arm_arch`]: in the target ecosystem the command's absence
/// is itself evidence of an ARM host, so the probe falls back rather
/// than erroring. Known quirk inherited from the original tooling.
pub fn host_arch() -> String {
    match command_output("arch", &[]).as_deref() {
        Some("i386") | Some("x86_64") => ARCH_X86_64.to_string(),
        _ => target_arm_arch(),
    }
}

/// Host details surfaced by status output
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub os: Os,
    pub arch: String,
    pub hostname: String,
    pub username: String,
}

impl HostInfo {
    /// Gather current host information
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: host_arch(),
            hostname: whoami::fallible::hostname().unwrap_or_else(|_| "unknown".to_string()),
            username: whoami::username(),
        }
    }
}
