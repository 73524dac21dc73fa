//! unibuild-core: build-target resolution for Apple-family builds
//!
//! This crate resolves which operating system and CPU architecture(s)
//! a build invocation should produce, locates the matching platform
//! SDK, fuses single-architecture builds into universal binaries, and
//! code-signs the resulting artifacts. The actual compile/configure
//! steps are external collaborators driven by the values resolved here.

mod assemble;
mod error;
mod sdk;
mod sign;
mod target;
mod toolchain;

pub use assemble::{FuseKind, FuseOutcome, create_universal_binaries, fuse_libraries};
pub use error::CoreError;
pub use sdk::{configure_extra_args, require_sdk_root, sdk_name, sdk_root};
pub use sign::{
    CODE_SIGN_ID_ENV, SignOptions, SignOutcome, SignReport, sign_artifacts, signable_artifacts,
    signing_identity,
};
pub use target::{ArchPair, BuildConfig, BuildTarget};
pub use toolchain::{
    MIN_UNIVERSAL_XCODE, lipo_path, supports_universal_binaries, xcode_developer_dir, xcode_version,
};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
