//! Toolchain capability probing

use std::path::PathBuf;

use tracing::debug;
use unibuild_platform::{Os, command_output};

/// Marker preceding the version token in the toolchain version report.
const XCODE_MARKER: &str = "Xcode ";

/// Minimum toolchain version able to fuse multi-architecture binaries.
///
/// Compared lexicographically, preserving the original loose version
/// gate. Documented value, not re-derived.
pub const MIN_UNIVERSAL_XCODE: &str = "11.0";

/// Extract the version token following the last `Xcode ` marker.
fn parse_xcode_version(output: &str) -> Option<String> {
    let idx = output.rfind(XCODE_MARKER)?;
    output[idx + XCODE_MARKER.len()..]
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// Version reported by `xcodebuild -version`, e.g. `16.2`.
///
/// `None` when the tool is missing or its output carries no version.
pub fn xcode_version() -> Option<String> {
    let output = command_output("xcodebuild", &["-version"])?;
    parse_xcode_version(&output)
}

/// Whether the installed toolchain can fuse multi-architecture binaries.
///
/// Only meaningful on a macOS host; false unconditionally elsewhere.
/// A probe or parse failure reads as unsupported, never as an error.
pub fn supports_universal_binaries() -> bool {
    if !Os::current().is_macos() {
        return false;
    }
    match xcode_version() {
        Some(version) => version.as_str() > MIN_UNIVERSAL_XCODE,
        None => {
            debug!("could not determine Xcode version, assuming no universal support");
            false
        }
    }
}

/// Active Xcode developer directory, per `xcode-select --print-path`.
pub fn xcode_developer_dir() -> Option<PathBuf> {
    command_output("xcode-select", &["--print-path"]).map(PathBuf::from)
}

/// Absolute path of the fusion tool inside the default toolchain.
pub fn lipo_path() -> Option<PathBuf> {
    xcode_developer_dir().map(|root| root.join("Toolchains/XcodeDefault.xctoolchain/usr/bin/lipo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_token() {
        let output = "Xcode 16.2\nBuild version 16C5032a";
        assert_eq!(parse_xcode_version(output).as_deref(), Some("16.2"));
    }

    #[test]
    fn parses_last_marker_occurrence() {
        let output = "warning: Xcode 14.0 deprecated\nXcode 15.4\nBuild version 15F31d";
        assert_eq!(parse_xcode_version(output).as_deref(), Some("15.4"));
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(parse_xcode_version("xcode-select: error: no developer tools"), None);
        assert_eq!(parse_xcode_version(""), None);
    }

    #[test]
    fn marker_without_token_is_none() {
        assert_eq!(parse_xcode_version("Xcode "), None);
    }

    #[test]
    fn version_gate_is_lexicographic() {
        assert!("16.2" > MIN_UNIVERSAL_XCODE);
        assert!("11.1" > MIN_UNIVERSAL_XCODE);
        assert!(!("11.0" > MIN_UNIVERSAL_XCODE));
        assert!(!("10.3" > MIN_UNIVERSAL_XCODE));
    }

    #[test]
    #[cfg(not(target_os = "macos"))]
    fn never_supported_off_macos() {
        assert!(!supports_universal_binaries());
    }
}
