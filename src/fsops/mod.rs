//! Capabilities the engine calls into but does not define: deletion,
//! sizing, deferred deletion of locked files, and the registry.
//!
//! Each is a trait so a front end (or a test) can swap in its own. The
//! local defaults cover plain filesystems; there is no deferred-delete
//! default and no registry outside Windows front ends that supply one.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Deletion and sizing primitives.
pub trait FileOps {
    /// Remove `path` (a file, symlink or empty directory). With `shred`,
    /// overwrite file contents before unlinking.
    fn delete(&self, path: &Path, shred: bool) -> io::Result<()>;

    /// Cut a file to zero length, keeping the directory entry.
    fn truncate(&self, path: &Path) -> io::Result<()>;

    /// Size of the entry itself, without following symlinks.
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Whether a deletion error means another process holds the file.
    fn is_locked(&self, err: &io::Error) -> bool {
        is_sharing_violation(err)
    }
}

/// Marks a locked file for removal at a later point (typically reboot).
pub trait DeferredDelete {
    fn mark_for_deletion(&self, path: &Path) -> io::Result<()>;
}

/// Registry access. `key` uses backslash-separated hive paths.
pub trait Registry {
    /// False on platforms without a registry.
    fn is_available(&self) -> bool;

    /// Whether the key, or the named value inside it, exists.
    fn exists(&self, key: &str, value: Option<&str>) -> Result<bool>;

    /// Delete the named value, or the whole key when `value` is `None`.
    /// Returns false when there was nothing to delete.
    fn delete(&self, key: &str, value: Option<&str>) -> Result<bool>;
}

/// Plain local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileOps for LocalFs {
    fn delete(&self, path: &Path, shred: bool) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            return fs::remove_dir(path);
        }
        if shred && meta.is_file() {
            overwrite(path, meta.len())?;
        }
        fs::remove_file(path)
    }

    fn truncate(&self, path: &Path) -> io::Result<()> {
        OpenOptions::new().write(true).truncate(true).open(path)?;
        Ok(())
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::symlink_metadata(path)?.len())
    }
}

/// No registry on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl Registry for NoRegistry {
    fn is_available(&self) -> bool {
        false
    }

    fn exists(&self, _key: &str, _value: Option<&str>) -> Result<bool> {
        Ok(false)
    }

    fn delete(&self, _key: &str, _value: Option<&str>) -> Result<bool> {
        Ok(false)
    }
}

/// Size of `path`, or 0 if it vanished since it was listed.
pub fn size_or_zero(ops: &dyn FileOps, path: &Path) -> Result<u64> {
    match ops.size(path) {
        Ok(size) => Ok(size),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Total size of regular files beneath `root`. Missing roots count as 0.
pub fn tree_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Locate `program` on `PATH` (or accept it as-is when it is a path).
pub fn find_executable(program: &str) -> Option<std::path::PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let exe = dir.join(format!("{}.exe", program));
            [plain, exe]
        })
        .find(|p| p.is_file())
}

fn overwrite(path: &Path, len: u64) -> io::Result<()> {
    const CHUNK: usize = 64 * 1024;
    let mut file = OpenOptions::new().write(true).open(path)?;
    let zeros = vec![0u8; CHUNK];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(CHUNK as u64) as usize;
        file.write_all(&zeros[..n])?;
        remaining -= n as u64;
    }
    file.sync_all()?;
    file.set_len(0)
}

#[cfg(windows)]
fn is_sharing_violation(err: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    matches!(err.raw_os_error(), Some(32) | Some(33))
}

#[cfg(not(windows))]
fn is_sharing_violation(_err: &io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn vanished_path_sizes_as_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(size_or_zero(&LocalFs, &dir.path().join("gone")).unwrap(), 0);
    }

    #[test]
    fn delete_removes_empty_dir_and_file() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let file = sub.join("f");
        fs::write(&file, b"abc").unwrap();
        LocalFs.delete(&file, false).unwrap();
        LocalFs.delete(&sub, false).unwrap();
        assert!(!sub.exists());
    }

    #[test]
    fn delete_refuses_non_empty_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f"), b"abc").unwrap();
        assert!(LocalFs.delete(dir.path(), false).is_err());
    }

    #[test]
    fn shred_unlinks_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("secret");
        fs::write(&file, vec![7u8; 200_000]).unwrap();
        LocalFs.delete(&file, true).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn tree_size_sums_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/x"), b"12345").unwrap();
        fs::write(dir.path().join("y"), b"123").unwrap();
        assert_eq!(tree_size(dir.path()), 8);
        assert_eq!(tree_size(&dir.path().join("missing")), 0);
    }

    #[test]
    fn no_registry_is_unavailable() {
        assert!(!NoRegistry.is_available());
        assert!(!NoRegistry.delete("HKCU\\Software\\X", None).unwrap());
    }
}
