//! Error types for gmu-core
//!
//! `ParseError` is the only domain error. Everything the object store SDK
//! reports is carried through `Error::Store` without translation.

use thiserror::Error;

/// Result type alias for gmu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error coming from the underlying object store SDK
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An S3 URI that could not be parsed, holding the offending input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("s3 uri must be of form 's3://<bucket>', got: {0}")]
pub struct ParseError(pub String);

impl ParseError {
    /// The original input that failed to parse
    pub fn input(&self) -> &str {
        &self.0
    }
}

/// Error types for gmu operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed S3 URI
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error returned by the object store, passed through as-is
    #[error(transparent)]
    Store(StoreError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Wrap an SDK error without altering it
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Store(Box::new(err))
    }

    /// Get the process exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Parse(_) | Error::Config(_) => 2, // UsageError
            Error::Store(_) => 3,                    // StoreError
            _ => 1,                                  // GeneralError
        }
    }
}
