//! Platform SDK location

use std::path::PathBuf;

use tracing::debug;
use unibuild_platform::command_output;

use crate::error::CoreError;
use crate::target::{BuildConfig, BuildTarget};

/// Token recognized in extra build arguments as an explicit SDK root
/// override.
const SYSROOT_TOKEN: &str = "CMAKE_OSX_SYSROOT";

/// SDK identifier passed to the SDK-path query tool.
pub fn sdk_name(target: BuildTarget) -> &'static str {
    match target {
        BuildTarget::Ios => "iphoneos",
        BuildTarget::VisionOs => "xros",
        _ => "macosx",
    }
}

/// Extract an explicit sysroot override from the extra build arguments.
///
/// The last override wins. Surrounding quotes and whitespace are
/// stripped; a blank value does not count as an override.
fn sysroot_override(build_args: &str) -> Option<String> {
    let mut sysroot = None;
    for arg in build_args.split_whitespace() {
        if !arg.contains(SYSROOT_TOKEN) {
            continue;
        }
        if let Some((_, value)) = arg.split_once('=') {
            let value = value.trim_matches('"').trim();
            if !value.is_empty() {
                sysroot = Some(value.to_string());
            }
        }
    }
    sysroot
}

/// Resolve the platform SDK root for the active target.
///
/// An explicit `CMAKE_OSX_SYSROOT` override in the extra build
/// arguments wins verbatim, bypassing the query tool. Otherwise
/// `xcrun --sdk <name> --show-sdk-path` is consulted; `None` means no
/// SDK root could be resolved.
pub fn sdk_root(config: &BuildConfig) -> Option<PathBuf> {
    if let Some(args) = &config.build_args {
        if let Some(root) = sysroot_override(args) {
            debug!(root = %root, "using explicit SDK root override");
            return Some(PathBuf::from(root));
        }
    }

    let sdk = sdk_name(config.target());
    command_output("xcrun", &["--sdk", sdk, "--show-sdk-path"]).map(PathBuf::from)
}

/// Like [`sdk_root`], but absence is a hard error for embedded targets.
///
/// Desktop builds may proceed with the toolchain's own default SDK
/// discovery, so a missing root is `Ok(None)` there.
pub fn require_sdk_root(config: &BuildConfig) -> Result<Option<PathBuf>, CoreError> {
    match sdk_root(config) {
        Some(root) => Ok(Some(root)),
        None if config.is_embedded() => Err(CoreError::SdkNotFound {
            target: config.target().to_string(),
            sdk: sdk_name(config.target()).to_string(),
        }),
        None => Ok(None),
    }
}

/// Append the cross-compile configure arguments embedded targets need.
///
/// Desktop targets pass through untouched. Embedded targets gain the
/// system name, the resolved sysroot, and the find-root modes required
/// to locate locally built dependencies outside the sysroot.
pub fn configure_extra_args(config: &BuildConfig, mut args: Vec<String>) -> Result<Vec<String>, CoreError> {
    if !config.is_embedded() {
        return Ok(args);
    }

    match require_sdk_root(config)? {
        Some(root) => {
            args.push(format!("-DCMAKE_SYSTEM_NAME={}", config.target()));
            args.push(format!("-DCMAKE_OSX_SYSROOT={}", root.display()));
            for mode in ["PACKAGE", "INCLUDE", "LIBRARY"] {
                args.push(format!("-DCMAKE_FIND_ROOT_PATH_MODE_{mode}=BOTH"));
            }
            Ok(args)
        }
        // require_sdk_root never returns Ok(None) for embedded targets.
        None => Ok(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(target: BuildTarget, build_args: Option<&str>) -> BuildConfig {
        let mut config = BuildConfig::new("/tmp/inst");
        if !matches!(target, BuildTarget::Universal) {
            config.set_target(target).unwrap();
        }
        config.build_args = build_args.map(str::to_string);
        config
    }

    #[test]
    fn sdk_names_per_target() {
        assert_eq!(sdk_name(BuildTarget::Native), "macosx");
        assert_eq!(sdk_name(BuildTarget::X86_64), "macosx");
        assert_eq!(sdk_name(BuildTarget::Arm64), "macosx");
        assert_eq!(sdk_name(BuildTarget::Universal), "macosx");
        assert_eq!(sdk_name(BuildTarget::Ios), "iphoneos");
        assert_eq!(sdk_name(BuildTarget::VisionOs), "xros");
    }

    #[test]
    fn override_token_is_extracted() {
        assert_eq!(
            sysroot_override("-DCMAKE_OSX_SYSROOT=/opt/sdk/MacOSX14.sdk").as_deref(),
            Some("/opt/sdk/MacOSX14.sdk")
        );
    }

    #[test]
    fn override_strips_quotes() {
        assert_eq!(
            sysroot_override(r#"-DCMAKE_OSX_SYSROOT="/opt/sdk/MacOSX14.sdk""#).as_deref(),
            Some("/opt/sdk/MacOSX14.sdk")
        );
    }

    #[test]
    fn last_override_wins() {
        let args = "-DCMAKE_OSX_SYSROOT=/first -DCMAKE_BUILD_TYPE=Release -DCMAKE_OSX_SYSROOT=/second";
        assert_eq!(sysroot_override(args).as_deref(), Some("/second"));
    }

    #[test]
    fn blank_override_is_ignored() {
        assert_eq!(sysroot_override(r#"-DCMAKE_OSX_SYSROOT="""#), None);
        assert_eq!(sysroot_override("-DCMAKE_BUILD_TYPE=Release"), None);
    }

    #[test]
    fn explicit_override_bypasses_query_tool() {
        let config = config_for(BuildTarget::Ios, Some("-DCMAKE_OSX_SYSROOT=/opt/sdk/iPhoneOS.sdk"));
        assert_eq!(sdk_root(&config), Some(PathBuf::from("/opt/sdk/iPhoneOS.sdk")));
    }

    #[test]
    fn override_satisfies_embedded_requirement() {
        let config = config_for(BuildTarget::VisionOs, Some("-DCMAKE_OSX_SYSROOT=/opt/sdk/XROS.sdk"));
        let root = require_sdk_root(&config).unwrap();
        assert_eq!(root, Some(PathBuf::from("/opt/sdk/XROS.sdk")));
    }

    // Without xcrun the query tool cannot resolve anything, which must
    // be fatal for embedded targets and tolerable for desktop ones.
    #[test]
    #[cfg(not(target_os = "macos"))]
    fn missing_sdk_is_fatal_only_for_embedded() {
        let embedded = config_for(BuildTarget::Ios, None);
        let err = require_sdk_root(&embedded).unwrap_err();
        assert!(matches!(err, CoreError::SdkNotFound { .. }));

        let desktop = config_for(BuildTarget::Native, None);
        assert!(require_sdk_root(&desktop).unwrap().is_none());
    }

    #[test]
    fn desktop_targets_keep_args_untouched() {
        let config = config_for(BuildTarget::Native, None);
        let args = configure_extra_args(&config, vec!["-DFOO=1".to_string()]).unwrap();
        assert_eq!(args, vec!["-DFOO=1".to_string()]);
    }

    #[test]
    fn embedded_targets_gain_cross_compile_args() {
        let config = config_for(BuildTarget::Ios, Some("-DCMAKE_OSX_SYSROOT=/opt/sdk/iPhoneOS.sdk"));
        let args = configure_extra_args(&config, vec![]).unwrap();
        assert_eq!(
            args,
            vec![
                "-DCMAKE_SYSTEM_NAME=iOS".to_string(),
                "-DCMAKE_OSX_SYSROOT=/opt/sdk/iPhoneOS.sdk".to_string(),
                "-DCMAKE_FIND_ROOT_PATH_MODE_PACKAGE=BOTH".to_string(),
                "-DCMAKE_FIND_ROOT_PATH_MODE_INCLUDE=BOTH".to_string(),
                "-DCMAKE_FIND_ROOT_PATH_MODE_LIBRARY=BOTH".to_string(),
            ]
        );
    }
}
