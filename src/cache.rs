//! Transient on-disk staging for uploaded images.
//!
//! Each upload is written to its own file, named with a random v4 UUID, and
//! removed again when its [`CachedUpload`] handle goes out of scope.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// A directory holding staged uploads.
#[derive(Debug, Clone)]
pub struct UploadCache {
    dir: PathBuf,
}

impl UploadCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `reader` into a new, uniquely named cache file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be created or written.
    /// A partially written file is removed before returning.
    pub fn store(&self, mut reader: impl Read) -> Result<CachedUpload> {
        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        let upload = CachedUpload { path };

        let mut file = File::create(&upload.path)?;
        let written = io::copy(&mut reader, &mut file)?;
        log::debug!("cached {written} bytes at {}", upload.path.display());

        Ok(upload)
    }
}

/// A staged upload, deleted when dropped.
#[derive(Debug)]
pub struct CachedUpload {
    path: PathBuf,
}

impl CachedUpload {
    /// Location of the cached file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached bytes back.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Delete the cached file now instead of on drop.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file exists but cannot be removed.
    pub fn remove(self) -> Result<()> {
        remove_if_present(&self.path)?;
        Ok(())
    }
}

impl Drop for CachedUpload {
    fn drop(&mut self) {
        if let Err(e) = remove_if_present(&self.path) {
            log::warn!("failed to remove cached upload {}: {e}", self.path.display());
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cache");
        let cache = UploadCache::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.dir(), dir.as_path());
    }

    #[test]
    fn store_writes_bytes_under_unique_names() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = UploadCache::new(tmp.path()).unwrap();

        let a = cache.store(&b"first"[..]).unwrap();
        let b = cache.store(&b"second"[..]).unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(a.path().parent(), Some(tmp.path()));
        assert_eq!(a.read().unwrap(), b"first");
        assert_eq!(b.read().unwrap(), b"second");
    }

    #[test]
    fn drop_removes_cached_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = UploadCache::new(tmp.path()).unwrap();

        let upload = cache.store(&b"bytes"[..]).unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn remove_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = UploadCache::new(tmp.path()).unwrap();

        let upload = cache.store(&b"bytes"[..]).unwrap();
        fs::remove_file(upload.path()).unwrap();
        assert!(upload.remove().is_ok());
    }
}
