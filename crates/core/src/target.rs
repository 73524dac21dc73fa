//! Build targets and per-invocation configuration

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;
use unibuild_platform::{ARCH_X86_64, host_arch, target_arm_arch};

use crate::error::CoreError;
use crate::toolchain;

/// Platform family a build is produced for.
///
/// Exactly one target is active per [`BuildConfig`]; every derived
/// facet is computed from this single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    Native,
    X86_64,
    Arm64,
    Universal,
    Ios,
    VisionOs,
}

impl BuildTarget {
    /// All selectable targets, in the order they are documented.
    pub const ALL: [BuildTarget; 6] = [
        BuildTarget::Native,
        BuildTarget::X86_64,
        BuildTarget::Arm64,
        BuildTarget::Universal,
        BuildTarget::Ios,
        BuildTarget::VisionOs,
    ];

    /// Returns the target name as used on the command line
    pub const fn as_str(&self) -> &'static str {
        match self {
            BuildTarget::Native => "native",
            BuildTarget::X86_64 => "x86_64",
            BuildTarget::Arm64 => "arm64",
            BuildTarget::Universal => "universal",
            BuildTarget::Ios => "iOS",
            BuildTarget::VisionOs => "visionOS",
        }
    }

    /// Embedded targets always build a single fixed ARM architecture
    /// against their own platform SDK.
    pub const fn is_embedded(&self) -> bool {
        matches!(self, BuildTarget::Ios | BuildTarget::VisionOs)
    }
}

impl Default for BuildTarget {
    fn default() -> Self {
        BuildTarget::Native
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BuildTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(BuildTarget::Native),
            "x86_64" => Ok(BuildTarget::X86_64),
            "arm64" => Ok(BuildTarget::Arm64),
            "universal" => Ok(BuildTarget::Universal),
            "ios" => Ok(BuildTarget::Ios),
            "visionos" => Ok(BuildTarget::VisionOs),
            _ => Err(CoreError::UnknownTarget(s.to_string())),
        }
    }
}

/// Ordered primary/secondary architecture pair.
///
/// The secondary architecture is present only for the universal target
/// and is always complementary to the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchPair {
    pub primary: String,
    pub secondary: Option<String>,
}

impl fmt::Display for ArchPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(secondary) => write!(f, "{} + {}", self.primary, secondary),
            None => write!(f, "{}", self.primary),
        }
    }
}

/// Mutable record owned by the caller for one build invocation.
///
/// Downstream components read the resolved target and derived fields;
/// only [`BuildConfig::set_target`] mutates the active target.
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    target: BuildTarget,
    /// Install output directory; fused binaries land under `lib/`.
    pub inst_dir: PathBuf,
    /// Extra configure arguments, which may carry an SDK root override.
    pub build_args: Option<String>,
}

impl BuildConfig {
    pub fn new(inst_dir: impl Into<PathBuf>) -> Self {
        Self {
            target: BuildTarget::default(),
            inst_dir: inst_dir.into(),
            build_args: None,
        }
    }

    /// The active build target
    pub fn target(&self) -> BuildTarget {
        self.target
    }

    // Derived facets are computed from the single target value so they
    // can never desynchronize from it.

    pub fn is_native(&self) -> bool {
        self.target == BuildTarget::Native
    }

    pub fn is_x86(&self) -> bool {
        self.target == BuildTarget::X86_64
    }

    pub fn is_arm64(&self) -> bool {
        self.target == BuildTarget::Arm64
    }

    pub fn is_universal(&self) -> bool {
        self.target == BuildTarget::Universal
    }

    pub fn is_embedded(&self) -> bool {
        self.target.is_embedded()
    }

    /// Switch the active build target.
    ///
    /// Selecting `universal` on a toolchain that cannot fuse
    /// multi-architecture binaries is a configuration error. The
    /// previous target is retained in that case, so callers never
    /// observe a universal configuration the toolchain cannot honor.
    pub fn set_target(&mut self, target: BuildTarget) -> Result<(), CoreError> {
        if target == BuildTarget::Universal && !toolchain::supports_universal_binaries() {
            debug!(previous = %self.target, "rejecting universal target, toolchain cannot fuse");
            return Err(CoreError::UniversalUnsupported);
        }
        self.target = target;
        Ok(())
    }

    /// Reflected target name.
    ///
    /// For the `arm64` target this is the effective ARM identifier, so
    /// an environment override is reflected back to the caller.
    pub fn target_name(&self) -> String {
        if self.target == BuildTarget::Arm64 {
            target_arm_arch()
        } else {
            self.target.as_str().to_string()
        }
    }

    /// Resolve the primary and optional secondary build architecture.
    pub fn arch_pair(&self) -> ArchPair {
        match self.target {
            // Embedded targets never build native/x86.
            BuildTarget::Ios | BuildTarget::VisionOs => ArchPair {
                primary: target_arm_arch(),
                secondary: None,
            },
            BuildTarget::Native => ArchPair {
                primary: host_arch(),
                secondary: None,
            },
            BuildTarget::X86_64 => ArchPair {
                primary: ARCH_X86_64.to_string(),
                secondary: None,
            },
            BuildTarget::Arm64 => ArchPair {
                primary: target_arm_arch(),
                secondary: None,
            },
            BuildTarget::Universal => {
                let primary = host_arch();
                let secondary = if primary == ARCH_X86_64 {
                    target_arm_arch()
                } else {
                    ARCH_X86_64.to_string()
                };
                ArchPair {
                    primary,
                    secondary: Some(secondary),
                }
            }
        }
    }

    /// Architecture value handed to the configure step.
    ///
    /// Universal renders as the semicolon-joined list the configure
    /// tooling expects, x86 first.
    pub fn target_arch(&self) -> String {
        match self.target {
            BuildTarget::Ios | BuildTarget::VisionOs => target_arm_arch(),
            BuildTarget::Native => host_arch(),
            BuildTarget::X86_64 => ARCH_X86_64.to_string(),
            BuildTarget::Arm64 => target_arm_arch(),
            BuildTarget::Universal => format!("{};{}", ARCH_X86_64, target_arm_arch()),
        }
    }

    /// Whether the resolved target architecture is ARM-family
    pub fn is_target_arm(&self) -> bool {
        self.target_arch() != ARCH_X86_64
    }
}
