//! [`Filesystem`] implementation over the local disk.

use std::fs;
use std::path::{Path, PathBuf};

use luaddon_core::{AddonError, AddonResult, BoxFuture, DeleteOptions, Filesystem};

use crate::delete::remove_path;
use crate::size::directory_size;

/// Filesystem gateway backed by `std::fs`.
///
/// Every call runs on tokio's blocking pool so callers can await many
/// addons at once without stalling the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem gateway.
    pub fn new() -> Self {
        Self
    }
}

/// Run blocking filesystem work off the async runtime.
async fn run_blocking<T, F>(path: &Path, work: F) -> AddonResult<T>
where
    T: Send + 'static,
    F: FnOnce(PathBuf) -> AddonResult<T> + Send + 'static,
{
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || work(owned))
        .await
        .map_err(|e| AddonError::io(path, std::io::Error::other(e)))?
}

impl Filesystem for LocalFilesystem {
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<String>> {
        Box::pin(run_blocking(path, |p| {
            fs::read_to_string(&p).map_err(|e| AddonError::io(&p, e))
        }))
    }

    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<bool>> {
        Box::pin(run_blocking(path, |p| {
            p.try_exists().map_err(|e| AddonError::io(&p, e))
        }))
    }

    fn directory_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<u64>> {
        Box::pin(run_blocking(path, |p| directory_size(&p)))
    }

    fn delete<'a>(
        &'a self,
        path: &'a Path,
        options: DeleteOptions,
    ) -> BoxFuture<'a, AddonResult<()>> {
        Box::pin(run_blocking(path, move |p| remove_path(&p, options)))
    }

    fn list_directories<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<Vec<PathBuf>>> {
        Box::pin(run_blocking(path, |p| {
            let entries = fs::read_dir(&p).map_err(|e| AddonError::io(&p, e))?;
            let mut dirs: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect();
            dirs.sort();
            Ok(dirs)
        }))
    }
}
