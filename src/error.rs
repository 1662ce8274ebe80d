use thiserror::Error;

/// Fatal configuration problems. Anything in here ends the run with a
/// non-zero exit status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A stacked scan was requested for a collection with no known layout.
    #[error("Unknown layout for collection '{0}'")]
    UnknownLayout(String),

    /// The user asked for collections that do not exist under the root.
    #[error("Invalid Collection Name: {}", .0.join(", "))]
    InvalidCollection(Vec<String>),

    /// The module file pattern is not a valid glob.
    #[error("Invalid module file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
