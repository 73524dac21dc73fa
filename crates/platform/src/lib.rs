//! unibuild-platform: host probing for unibuild
//!
//! This crate detects the host operating system and CPU architecture
//! and provides the external-command capture helper the probes (and
//! the rest of unibuild) are built on.

mod command;
mod host;

pub use command::command_output;
pub use host::{ARCH_ARM64, ARCH_X86_64, ARM_ARCH_ENV, HostInfo, Os, host_arch, target_arm_arch};
