use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
///
/// Backends move opaque JSON documents addressed by a key (`admins`,
/// `session`). What the documents mean is decided by the callers:
/// [`super::local::LocalRepository`] and [`crate::session::Session`].
pub trait StorageBackend {
    /// Read the document stored under `key`.
    /// Returns Ok(None) if nothing has been stored yet.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `content` under `key`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save(&self, key: &str, content: &str) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Where `key` lives. For FsBackend, this is the real path.
    /// For MemBackend, a virtual path.
    fn location(&self, key: &str) -> PathBuf;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, content: &str) -> Result<()> {
        (**self).save(key, content)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn location(&self, key: &str) -> PathBuf {
        (**self).location(key)
    }
}
