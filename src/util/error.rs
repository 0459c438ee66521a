//! Error types for transform evaluation.

use thiserror::Error;

/// Main error type for hierarchy authoring and transform queries.
#[derive(Error, Debug)]
pub enum Error {
    /// Node cannot carry transform ops (e.g. a scope or an untyped node)
    #[error("Node at path {path} is not transformable")]
    InvalidNodeKind { path: String },

    /// Node id or path does not resolve in this stage
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Malformed node path
    #[error("Invalid node path: {0}")]
    InvalidPath(String),

    /// A node with this path already exists with a different kind
    #[error("Node already defined: {0}")]
    DuplicateNode(String),

    /// Time-sampled value constructed without any value
    #[error("Time samples must contain a default or at least one sample")]
    EmptySamples,

    /// Sample time is not a finite number
    #[error("Invalid sample time: {0}")]
    InvalidSampleTime(f64),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid node kind error for the given path.
    pub fn invalid_kind(path: impl Into<String>) -> Self {
        Self::InvalidNodeKind { path: path.into() }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create a node-not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NodeNotFound(what.into())
    }
}

/// Result type alias for transform evaluation.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::invalid_kind("/World/Scope");
        assert!(e.to_string().contains("/World/Scope"));
        assert!(e.to_string().contains("not transformable"));

        let e = Error::InvalidSampleTime(f64::NAN);
        assert!(e.to_string().contains("NaN"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
