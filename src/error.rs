use thiserror::Error;

/// Unified error type for the updater
#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing `{0}` environment variable!")]
    MissingCredential(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unknown swift version string: {0}")]
    UnknownVersion(String),

    #[error("`SWIFT_BRANCH` not found!")]
    BranchNotFound,

    #[error("`SWIFT_VERSION` not found!")]
    VersionNotFound,

    #[error("`{command}` failed with status: {status}\n{message}")]
    CommandFailed {
        command: String,
        message: String,
        status: i32,
    },

    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("commit `{message}` produced no new revision (HEAD is still {revision})")]
    NoOpCommit { message: String, revision: String },

    #[error("Request to {endpoint} failed: {message}")]
    Remote { endpoint: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in the updater
pub type Result<T> = std::result::Result<T, UpdaterError>;

impl UpdaterError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        UpdaterError::Config(msg.into())
    }

    /// Create a remote API error for the given endpoint
    pub fn remote(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        UpdaterError::Remote {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }
}
