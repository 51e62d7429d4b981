//! SVFS-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SvfsError>;

/// Top-level error type for the versioning layer.
///
/// The write-intercept trigger itself never surfaces these to the filesystem
/// caller (it fails open); they are for the layers that do own their
/// failures: configuration loading, the purge CLI, and the logger spawn.
#[derive(Debug, Error)]
pub enum SvfsError {
    #[error("[SVFS-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SVFS-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SVFS-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SVFS-2001] snapshot copy failure for {path}: {details}")]
    SnapshotCopy { path: PathBuf, details: String },

    #[error("[SVFS-2002] snapshot delete failure for {path}: {details}")]
    SnapshotDelete { path: PathBuf, details: String },

    #[error("[SVFS-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SVFS-3002] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SVFS-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SvfsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SVFS-1001",
            Self::MissingConfig { .. } => "SVFS-1002",
            Self::ConfigParse { .. } => "SVFS-1003",
            Self::SnapshotCopy { .. } => "SVFS-2001",
            Self::SnapshotDelete { .. } => "SVFS-2002",
            Self::Io { .. } => "SVFS-3001",
            Self::ChannelClosed { .. } => "SVFS-3002",
            Self::Runtime { .. } => "SVFS-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SnapshotCopy { .. }
                | Self::SnapshotDelete { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SvfsError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigParse {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SvfsError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
