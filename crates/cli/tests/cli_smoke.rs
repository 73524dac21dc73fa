//! CLI smoke tests for unibuild.
//!
//! These tests verify that all CLI commands run without panicking and
//! return appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the unibuild binary.
fn unibuild_cmd() -> Command {
    cargo_bin_cmd!("unibuild")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
    unibuild_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
    unibuild_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unibuild"));
}

#[test]
fn subcommand_help_works() {
    for cmd in &["resolve", "sdk", "fuse", "sign", "status"] {
        unibuild_cmd()
            .arg(cmd)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}

// =============================================================================
// resolve
// =============================================================================

#[test]
#[serial]
fn resolve_native_prints_primary_arch() {
    unibuild_cmd()
        .arg("resolve")
        .arg("native")
        .env_remove("MACOS_ARM_ARCHITECTURE")
        .assert()
        .success()
        .stdout(predicate::str::contains("Primary:"));
}

#[test]
#[serial]
fn resolve_x86_as_json() {
    unibuild_cmd()
        .arg("resolve")
        .arg("x86_64")
        .arg("--json")
        .env_remove("MACOS_ARM_ARCHITECTURE")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"primary\": \"x86_64\""))
        .stdout(predicate::str::contains("\"secondary\": null"));
}

#[test]
#[serial]
fn resolve_embedded_is_arm() {
    unibuild_cmd()
        .arg("resolve")
        .arg("iOS")
        .env_remove("MACOS_ARM_ARCHITECTURE")
        .assert()
        .success()
        .stdout(predicate::str::contains("arm64"));
}

#[test]
#[serial]
fn resolve_honors_arm_override() {
    unibuild_cmd()
        .arg("resolve")
        .arg("arm64")
        .env("MACOS_ARM_ARCHITECTURE", "arm64e")
        .assert()
        .success()
        .stdout(predicate::str::contains("arm64e"));
}

#[test]
fn resolve_unknown_target_fails() {
    unibuild_cmd()
        .arg("resolve")
        .arg("sparc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown build target"));
}

#[test]
#[cfg(not(target_os = "macos"))]
fn resolve_universal_rejected_without_toolchain() {
    unibuild_cmd()
        .arg("resolve")
        .arg("universal")
        .assert()
        .failure()
        .stderr(predicate::str::contains("universal"));
}

// =============================================================================
// sdk
// =============================================================================

#[test]
fn sdk_override_is_verbatim() {
    unibuild_cmd()
        .arg("sdk")
        .arg("iOS")
        .arg("--build-args")
        .arg("-DCMAKE_OSX_SYSROOT=/opt/sdk/iPhoneOS.sdk")
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/sdk/iPhoneOS.sdk"));
}

#[test]
#[cfg(not(target_os = "macos"))]
fn sdk_missing_is_fatal_for_embedded() {
    unibuild_cmd()
        .arg("sdk")
        .arg("visionOS")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SDK"));
}

#[test]
#[cfg(not(target_os = "macos"))]
fn sdk_missing_is_tolerated_for_desktop() {
    unibuild_cmd().arg("sdk").arg("native").assert().success();
}

// =============================================================================
// fuse
// =============================================================================

#[test]
#[cfg(not(target_os = "macos"))]
fn fuse_unsupported_off_macos() {
    let temp = TempDir::new().unwrap();
    unibuild_cmd()
        .arg("fuse")
        .arg("--install-dir")
        .arg(temp.path().join("inst"))
        .arg("--primary-dir")
        .arg(temp.path().join("primary"))
        .arg("--secondary-dir")
        .arg(temp.path().join("secondary"))
        .arg("libFoo.dylib")
        .assert()
        .failure()
        .stderr(predicate::str::contains("universal"));
}

// =============================================================================
// sign
// =============================================================================

#[test]
#[cfg(not(target_os = "macos"))]
fn sign_skips_on_non_macos_host() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("libFoo.dylib"), "payload").unwrap();

    unibuild_cmd()
        .arg("sign")
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped"));

    // Nothing was touched.
    assert_eq!(std::fs::read_to_string(temp.path().join("libFoo.dylib")).unwrap(), "payload");
}

// =============================================================================
// status
// =============================================================================

#[test]
fn status_shows_host_details() {
    unibuild_cmd()
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("Host arch"));
}
