//! Universal binary assembly
//!
//! Fuses per-architecture shared-library builds into multi-architecture
//! artifacts under `<inst_dir>/lib`. Symbolic-link aliases (re-exported
//! library names) are never fused; they are recreated against the fused
//! outputs in a second pass.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, warn};
use unibuild_platform::Os;

use crate::error::CoreError;
use crate::target::BuildConfig;
use crate::toolchain;

#[cfg(unix)]
use std::os::unix::fs::symlink;
#[cfg(windows)]
use std::os::windows::fs::symlink_file as symlink;

/// How a library ended up in the install output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FuseKind {
    /// Fused from two single-architecture copies.
    Fused,
    /// Recreated as a symbolic link to an already-fused target.
    Relinked,
}

/// Result of one per-library fusion or relink step.
#[derive(Debug, Clone, Serialize)]
pub struct FuseOutcome {
    pub lib_name: String,
    pub kind: FuseKind,
    /// The exact fusion command issued. Relinked aliases issue none.
    pub command: Option<String>,
    /// Diagnostic captured when the step failed.
    pub error: Option<String>,
}

impl FuseOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fuse the named libraries into universal binaries under the install
/// tree.
///
/// Off macOS this is unsupported. The fusion tool is resolved through
/// the active Xcode developer directory; each library yields an
/// outcome, and an individual fusion failure is recorded rather than
/// aborting the batch.
pub fn create_universal_binaries(
    config: &BuildConfig,
    lib_names: &[String],
    primary_dir: &Path,
    secondary_dir: &Path,
) -> Result<Vec<FuseOutcome>, CoreError> {
    if !Os::current().is_macos() {
        return Err(CoreError::UniversalUnsupported);
    }
    let lipo = toolchain::lipo_path().ok_or(CoreError::LipoNotFound)?;
    fuse_libraries(&lipo, &config.inst_dir, lib_names, primary_dir, secondary_dir)
}

/// Inner assembly routine with the fusion tool path injected.
///
/// Re-running with identical inputs is safe: stale outputs are removed
/// before replacement, and the final state converges.
pub fn fuse_libraries(
    lipo: &Path,
    inst_dir: &Path,
    lib_names: &[String],
    primary_dir: &Path,
    secondary_dir: &Path,
) -> Result<Vec<FuseOutcome>, CoreError> {
    let output_dir = inst_dir.join("lib");
    let mut outcomes = Vec::with_capacity(lib_names.len());

    // First pass: fuse every concrete file. Aliases are handled
    // afterwards so they can point at the fused outputs.
    for name in lib_names {
        let primary = primary_dir.join(name);
        if primary.is_symlink() {
            continue;
        }

        fs::create_dir_all(&output_dir)?;
        let output = output_dir.join(name);
        remove_if_present(&output)?;

        let secondary = secondary_dir.join(name);
        let command = format!(
            "{} -create {} {} -output {}",
            lipo.display(),
            primary.display(),
            secondary.display(),
            output.display()
        );
        debug!(lib = %name, "fusing");

        let error = match Command::new(lipo)
            .arg("-create")
            .arg(&primary)
            .arg(&secondary)
            .arg("-output")
            .arg(&output)
            .status()
        {
            Ok(status) if status.success() => None,
            Ok(status) => {
                warn!(lib = %name, code = ?status.code(), "fusion tool failed");
                Some(format!("fusion tool exited with code {:?}", status.code()))
            }
            Err(err) => {
                warn!(lib = %name, error = %err, "failed to run fusion tool");
                Some(err.to_string())
            }
        };

        outcomes.push(FuseOutcome {
            lib_name: name.clone(),
            kind: FuseKind::Fused,
            command: Some(command),
            error,
        });
    }

    // Second pass: recreate aliases pointing at the fused targets.
    for name in lib_names {
        let primary = primary_dir.join(name);
        if !primary.is_symlink() {
            continue;
        }

        let output = output_dir.join(name);
        remove_if_present(&output)?;

        let target = fs::read_link(&primary)?;
        let target_name: PathBuf = match target.file_name() {
            Some(base) => PathBuf::from(base),
            None => target.clone(),
        };
        let link_target = output_dir.join(target_name);
        debug!(lib = %name, target = %link_target.display(), "relinking alias");
        symlink(&link_target, &output)?;

        outcomes.push(FuseOutcome {
            lib_name: name.clone(),
            kind: FuseKind::Relinked,
            command: None,
            error: None,
        });
    }

    Ok(outcomes)
}

/// Remove a stale output, including a dangling symlink.
fn remove_if_present(path: &Path) -> std::io::Result<()> {
    if path.symlink_metadata().is_ok() {
        fs::remove_file(path)?;
    }
    Ok(())
}
