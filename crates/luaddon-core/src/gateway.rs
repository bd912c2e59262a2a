//! Traits for the external collaborators the addon engine talks to.
//!
//! The engine never touches the filesystem, the settings file, the remote
//! catalog or the user interface directly; it goes through these seams so
//! each can be swapped for a fake in tests or a host-specific backend.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::error::{AddonError, AddonResult};

/// Type alias for boxed futures returned by gateway methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Options for deleting a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Delete directories with their contents.
    pub recursive: bool,
    /// Move to the trash instead of unlinking.
    pub use_trash: bool,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            use_trash: true,
        }
    }
}

/// Filesystem access used by addon entities.
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8 text. Fails if the file is absent.
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<String>>;

    /// Check whether a path exists.
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<bool>>;

    /// Total size in bytes of all files below a directory.
    fn directory_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<u64>>;

    /// Delete a file or directory.
    fn delete<'a>(&'a self, path: &'a Path, options: DeleteOptions) -> BoxFuture<'a, AddonResult<()>>;

    /// List the immediate subdirectories of a directory.
    fn list_directories<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<Vec<PathBuf>>>;
}

/// Workspace settings access.
///
/// Values are addressed by `section` and `key` (e.g. `Lua` and
/// `workspace.library`). Reads fail with [`AddonError::NoWorkspace`] when no
/// workspace is open.
pub trait SettingsStore: Send + Sync {
    /// Read a setting. `Ok(None)` means the workspace has no value for it.
    fn get<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, AddonResult<Option<serde_json::Value>>>;

    /// Write a setting.
    fn set<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
        value: serde_json::Value,
    ) -> BoxFuture<'a, AddonResult<()>>;
}

/// An addon as described by the remote catalog.
pub trait RemoteAddon: Send + Sync {
    /// Addon name, matching the local directory name.
    fn name(&self) -> &str;

    /// Unix milliseconds of the most recent upstream change.
    fn latest_change(&self) -> BoxFuture<'_, AddonResult<i64>>;
}

/// Recovery action offered to the user when an operation cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RecoveryAction {
    /// Ask the user to open a workspace folder.
    #[strum(to_string = "Open a workspace folder")]
    OpenWorkspace,
}

impl RecoveryAction {
    /// Recovery action suited to an error, if any.
    pub fn for_error(error: &AddonError) -> Option<Self> {
        match error {
            AddonError::NoWorkspace => Some(Self::OpenWorkspace),
            _ => None,
        }
    }
}

/// User-facing notifications from the engine.
pub trait Notifier: Send + Sync {
    /// Present an error along with an action that resolves it.
    fn offer_recovery(&self, error: &AddonError, action: RecoveryAction);
}
