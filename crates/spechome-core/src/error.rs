use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read region file {path}: {source}")]
    RegionFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse region file: {0}")]
    RegionFileParse(#[from] serde_yaml::Error),

    #[error("region validation failed: {0}")]
    Validation(String),
}

/// Errors raised when mutating a session [`crate::Shortlist`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShortlistError {
    #[error("listing has no identifier")]
    MissingId,
}
