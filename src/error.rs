use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FindError {
    // Traversal
    #[error("'{}': permission denied", .0.display())]
    PermissionDenied(PathBuf),

    #[error("'{}': no such file or directory", .0.display())]
    NotFound(PathBuf),

    #[error("'{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("traversal error: {0}")]
    Source(String),

    // Chain construction (fatal)
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown argument to -type: '{0}'")]
    InvalidType(String),

    #[error("missing argument to '{0}'")]
    MissingArgument(String),

    #[error("unknown predicate '{0}'")]
    UnknownPredicate(String),

    #[error("argument is not valid UTF-8: '{0}'")]
    NonUtf8Argument(String),

    // Runtime side effects
    #[error("{what} lookup failed for '{key}': {reason}")]
    Lookup {
        what: &'static str,
        key: String,
        reason: String,
    },

    #[error("'{}': write failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FindError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::Io { path: p, .. }
            | Self::Write { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the traversal keeps going after this error.
    ///
    /// Per-entry stat failures, unreadable directories, identity database
    /// trouble and failed writes are reported and skipped. Everything that
    /// comes out of building the predicate chain ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::NotFound(_)
                | Self::Io { .. }
                | Self::Source(_)
                | Self::Lookup { .. }
                | Self::Write { .. }
        )
    }

    /// Classify an `io::Error` raised while touching `path`.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: err },
        }
    }
}
