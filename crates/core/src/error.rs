//! Error types for unibuild-core

use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown build target '{0}' (expected one of: native, x86_64, arm64, universal, iOS, visionOS)")]
    UnknownTarget(String),

    #[error("universal binaries are only supported on a macOS host with Xcode 11.0 or later")]
    UniversalUnsupported,

    #[error("no {sdk} SDK found for target '{target}'")]
    SdkNotFound { target: String, sdk: String },

    #[error("lipo not found: no Xcode developer directory is active")]
    LipoNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
