use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::Path,
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// # Errors
///
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory
/// * [`FileSystemError::Directory`] if the directory could not be created
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| {
            FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            }
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Writes `contents` to a file that must not exist yet.
///
/// The check and the creation are a single `create_new` open, so an existing
/// file is never truncated.
///
/// # Errors
///
/// * [`FileSystemError::AlreadyExists`] if something already lives at `path`
/// * [`FileSystemError::File`] if creating or writing the file fails
pub fn write_new_file<P: AsRef<Path>>(path: P, contents: &str) -> FileSystemResult<()> {
    let path = path.as_ref();

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                FileSystemError::AlreadyExists {
                    path: path.to_path_buf(),
                }
            } else {
                FileSystemError::File {
                    path: path.to_path_buf(),
                    action: "create",
                    source: err,
                }
            }
        })?;

    file.write_all(contents.as_bytes())
        .map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "write",
                source: err,
            }
        })
}

/// Reads a file into a string, attaching the path to any error.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> FileSystemResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| {
        FileSystemError::File {
            path: path.to_path_buf(),
            action: "read",
            source: err,
        }
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_ensure_dir_exists() {
        let dir = tempdir().unwrap();
        let new_dir = dir.path().join("new_dir").join("nested");
        ensure_dir_exists(&new_dir).unwrap();
        assert!(new_dir.is_dir());
    }

    #[test]
    fn test_ensure_dir_exists_already_exists() {
        let dir = tempdir().unwrap();
        ensure_dir_exists(dir.path()).unwrap();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_ensure_dir_exists_file_collision() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("file.txt");
        fs::write(&file_path, "hello").unwrap();
        assert!(matches!(
            ensure_dir_exists(&file_path),
            Err(FileSystemError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_write_new_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("user_repository.rs");
        write_new_file(&file_path, "pub struct UserRepository;\n").unwrap();
        assert_eq!(
            fs::read_to_string(&file_path).unwrap(),
            "pub struct UserRepository;\n"
        );
    }

    #[test]
    fn test_write_new_file_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("user_repository.rs");
        fs::write(&file_path, "original").unwrap();

        let result = write_new_file(&file_path, "replacement");
        assert!(matches!(
            result,
            Err(FileSystemError::AlreadyExists { .. })
        ));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");
    }

    #[test]
    fn test_write_new_file_missing_parent() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing").join("file.rs");
        assert!(matches!(
            write_new_file(&file_path, ""),
            Err(FileSystemError::File { .. })
        ));
    }

    #[test]
    fn test_read_to_string_missing() {
        let dir = tempdir().unwrap();
        let result = read_to_string(dir.path().join("nope.txt"));
        assert!(matches!(
            result,
            Err(FileSystemError::File { action: "read", .. })
        ));
    }
}
