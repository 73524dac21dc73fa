//! Artifact code-signing
//!
//! Discovers dynamic/shared-library artifacts under an install tree and
//! signs each one in place. Signing is best-effort: individual failures
//! are recorded per artifact and the run continues, preserving the
//! original fire-and-forget contract.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, warn};
use unibuild_platform::{Os, command_output};

use crate::error::CoreError;
use crate::toolchain;

/// Environment variable overriding the code-signing identity.
pub const CODE_SIGN_ID_ENV: &str = "CODE_SIGN_ID";

/// The ad-hoc identity used when no development identity is available.
const AD_HOC_IDENTITY: &str = "-";

/// Options for a signing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignOptions {
    /// Surface the signing tool's own output instead of suppressing it.
    pub verbose: bool,
}

/// Result of signing one artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SignOutcome {
    pub path: PathBuf,
    /// Diagnostic captured when signing this artifact failed.
    pub error: Option<String>,
}

impl SignOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of a signing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignReport {
    /// True when the host cannot sign and nothing was touched.
    pub skipped: bool,
    /// Identity used for this run, absent when skipped.
    pub identity: Option<String>,
    pub outcomes: Vec<SignOutcome>,
}

impl SignReport {
    pub fn signed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.signed()
    }

    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }
}

/// Discover signable artifacts under the install tree.
///
/// A file qualifies when its name contains a shared or dynamic library
/// extension substring. The loose match is deliberate: it also catches
/// versioned names like `libfoo.so.1`.
pub fn signable_artifacts(install_path: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(install_path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.contains(".so") || name.contains(".dylib")
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Choose the signing identity.
///
/// An explicit `CODE_SIGN_ID` override wins. Otherwise prefer the
/// development identity matching a modern toolchain, fall back to the
/// legacy development identity, and finally to the ad-hoc identity.
pub fn signing_identity(xcode_version: Option<&str>, identities: &str) -> String {
    if let Ok(id) = env::var(CODE_SIGN_ID_ENV) {
        if !id.trim().is_empty() {
            return id;
        }
    }

    let version: f32 = xcode_version.and_then(|v| v.parse().ok()).unwrap_or(0.0);
    if version >= 11.0 && identities.contains("Apple Development") {
        "Apple Development".to_string()
    } else if identities.contains("Mac Developer") {
        "Mac Developer".to_string()
    } else {
        AD_HOC_IDENTITY.to_string()
    }
}

/// Sign every discovered artifact under the install tree, in place.
///
/// Off macOS the run is skipped and nothing is touched. Failures are
/// recorded per artifact; the signing tool's output is suppressed
/// unless `verbose` is set.
pub fn sign_artifacts(install_path: &Path, opts: SignOptions) -> Result<SignReport, CoreError> {
    if !Os::current().is_macos() {
        debug!("not a macOS host, skipping code signing");
        return Ok(SignReport {
            skipped: true,
            ..Default::default()
        });
    }

    let identities = command_output("security", &["find-identity", "-vp", "codesigning"]).unwrap_or_default();
    let identity = signing_identity(toolchain::xcode_version().as_deref(), &identities);
    let files = signable_artifacts(install_path);
    debug!(identity = %identity, count = files.len(), "signing artifacts");

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let mut command = Command::new("codesign");
        command.arg("-f").arg("-s").arg(&identity).arg(&file);
        if !opts.verbose {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let error = match command.status() {
            Ok(status) if status.success() => None,
            Ok(status) => {
                warn!(path = %file.display(), code = ?status.code(), "codesign failed");
                Some(format!("codesign exited with code {:?}", status.code()))
            }
            Err(err) => {
                warn!(path = %file.display(), error = %err, "failed to run codesign");
                Some(err.to_string())
            }
        };

        outcomes.push(SignOutcome { path: file, error });
    }

    Ok(SignReport {
        skipped: false,
        identity: Some(identity),
        outcomes,
    })
}
