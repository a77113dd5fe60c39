//! Filesystem helpers that attach the offending path to every error.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(BuildError::MissingInput(path.to_path_buf()))
    }
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
    }
    Ok(())
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BuildError::io(path, e))
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| BuildError::json(path, e))
}

pub fn write(path: &Path, data: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, data).map_err(|e| BuildError::io(path, e))
}

/// Pretty JSON with a 2-space indent, the layout the host writes itself.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value)?;
    write(path, data)
}

/// Copy `src` to `dst`, creating `dst`'s directory. Missing `src` is fatal.
pub fn copy(src: &Path, dst: &Path) -> Result<()> {
    require_file(src)?;
    ensure_parent(dst)?;
    fs::copy(src, dst).map_err(|e| BuildError::io(src, e))?;
    Ok(())
}

pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// All files under `root` with the given extension, sorted by path.
///
/// A missing root yields an empty list.
pub fn files_with_extension(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(vec![]);
    }
    let mut files = vec![];
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == ext) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// `path` relative to `base`, joined with forward slashes.
pub fn relative_slash(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_with_extension_sorted_and_recursive() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("b/z.json"), "{}").unwrap();
        write(&dir.path().join("a.json"), "{}").unwrap();
        write(&dir.path().join("a.jpg"), "").unwrap();

        let files = files_with_extension(dir.path(), "json").unwrap();
        let rel: Vec<_> = files.iter().map(|f| relative_slash(f, dir.path())).collect();
        assert_eq!(rel, vec!["a.json", "b/z.json"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = files_with_extension(&dir.path().join("nope"), "json").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = copy(&dir.path().join("x.png"), &dir.path().join("y.png")).unwrap_err();
        assert!(matches!(err, BuildError::MissingInput(_)));
    }
}
