//! Recursive directory sizing with jwalk.

use std::collections::HashSet;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use jwalk::{Parallelism, WalkDir};

use luaddon_core::{AddonError, AddonResult};

/// Sum the apparent size of every regular file below `root`.
///
/// Hardlinked files are counted once. Unreadable entries below the root are
/// skipped; an unreadable root is an error.
pub fn directory_size(root: &Path) -> AddonResult<u64> {
    let metadata = std::fs::metadata(root).map_err(|e| AddonError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(AddonError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let walker = WalkDir::new(root)
        .parallelism(Parallelism::RayonDefaultPool {
            busy_timeout: std::time::Duration::from_millis(100),
        })
        .skip_hidden(false)
        .follow_links(false);

    let mut seen_inodes = HashSet::new();
    let mut total: u64 = 0;

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!("skipping unreadable entry below {}: {err}", root.display());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!("no metadata for {}: {err}", entry.path().display());
                continue;
            }
        };

        // Only count size for first hardlink
        if get_nlink(&metadata) > 1 && !seen_inodes.insert(inode_key(&metadata)) {
            continue;
        }

        total += metadata.len();
    }

    Ok(total)
}

#[cfg(unix)]
fn get_nlink(metadata: &std::fs::Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
fn get_nlink(_metadata: &std::fs::Metadata) -> u64 {
    1 // Assume single link on Windows
}

#[cfg(unix)]
fn inode_key(metadata: &std::fs::Metadata) -> (u64, u64) {
    (metadata.dev(), metadata.ino())
}

#[cfg(not(unix))]
fn inode_key(_metadata: &std::fs::Metadata) -> (u64, u64) {
    (0, 0)
}
