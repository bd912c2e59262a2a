//! Deletion with optional trash support.

use std::fs;
use std::path::Path;

use luaddon_core::{AddonError, AddonResult, DeleteOptions};

/// Delete a file or directory.
///
/// With `use_trash` the path is moved to the platform trash so it can be
/// recovered. Without `recursive`, only empty directories can be removed.
pub fn remove_path(path: &Path, options: DeleteOptions) -> AddonResult<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| AddonError::io(path, e))?;

    if metadata.is_dir() && !options.recursive {
        let mut entries = fs::read_dir(path).map_err(|e| AddonError::io(path, e))?;
        if entries.next().is_some() {
            return Err(AddonError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::DirectoryNotEmpty,
                    "directory not empty and recursive deletion not requested",
                ),
            ));
        }
    }

    if options.use_trash {
        return trash::delete(path).map_err(|e| AddonError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    let result = if metadata.is_dir() {
        if options.recursive {
            fs::remove_dir_all(path)
        } else {
            fs::remove_dir(path)
        }
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| AddonError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PERMANENT: DeleteOptions = DeleteOptions {
        recursive: true,
        use_trash: false,
    };

    #[test]
    fn test_remove_directory_recursively() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("addon");
        fs::create_dir_all(target.join("library")).unwrap();
        fs::write(target.join("library/a.lua"), "return {}").unwrap();

        remove_path(&target, PERMANENT).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_non_recursive_refuses_full_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("addon");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("config.json"), "{}").unwrap();

        let options = DeleteOptions {
            recursive: false,
            use_trash: false,
        };
        assert!(remove_path(&target, options).is_err());
        assert!(target.exists());
    }

    #[test]
    fn test_remove_single_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join(".version");
        fs::write(&target, "1000").unwrap();

        remove_path(&target, PERMANENT).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = remove_path(&temp.path().join("absent"), PERMANENT).unwrap_err();
        assert!(err.is_not_found());
    }
}
