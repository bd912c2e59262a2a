//! Error types for addon operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for addon operations.
pub type AddonResult<T> = Result<T, AddonError>;

/// Errors that can occur while managing addons.
#[derive(Debug, Error)]
pub enum AddonError {
    /// The addon config file is missing or malformed.
    #[error("Addon config unreadable at {path}: {reason}")]
    ConfigUnreadable { path: PathBuf, reason: String },

    /// Settings cannot be accessed because no workspace is open.
    #[error("No workspace is open")]
    NoWorkspace,

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving a path to the trash failed.
    #[error("Failed to move {path} to trash: {message}")]
    Trash { path: PathBuf, message: String },

    /// Settings could not be decoded or persisted.
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// An addon location cannot be written as an enabled-list entry that
    /// names the addon again.
    #[error("Addon {name} at {path} is not under a <namespace>/addons directory")]
    UnrecognizedLocation { name: String, path: PathBuf },

    /// No addon with this name is installed.
    #[error("Addon not installed: {name}")]
    UnknownAddon { name: String },

    /// Remote catalog could not be read.
    #[error("Remote registry error: {message}")]
    Registry { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl AddonError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a settings error from any displayable cause.
    pub fn settings(message: impl std::fmt::Display) -> Self {
        Self::Settings {
            message: message.to_string(),
        }
    }

    /// Whether the error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addon_error_io() {
        let err = AddonError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, AddonError::PermissionDenied { .. }));

        let err = AddonError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = AddonError::io("/test/path", std::io::Error::other("boom"));
        assert!(matches!(err, AddonError::Io { .. }));
    }
}
