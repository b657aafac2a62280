use std::path::PathBuf;
use thiserror::Error;

/// Invalid run configuration. Surfaced before any hashing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported hash algorithm `{0}` (expected one of: sha1, sha256, sha512, xxh3)")]
    UnsupportedAlgorithm(String),

    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(i64),

    #[error("unknown platform `{0}` (expected one of: ios, android)")]
    UnknownPlatform(String),

    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of a whole fingerprint run. No partial fingerprint is ever produced.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source `{id}` is listed twice with conflicting definitions")]
    DuplicateSource { id: String },

    #[error("failed to start hashing workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FingerprintError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = FingerprintError> = std::result::Result<T, E>;
