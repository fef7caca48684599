//! Durable key-value storage for the user-defined kits.
//!
//! The store only ever reads or replaces the single value under
//! [`STORAGE_KEY`]; there are no partial updates.
use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Key under which the kit list is stored.
pub const STORAGE_KEY: &str = "cdna-kits";

/// A single-slot durable store holding the serialized kit list.
pub trait KitStorage {
    /// Current value, or `None` when nothing was ever written.
    fn read(&self) -> io::Result<Option<String>>;
    /// Replace the stored value.
    fn write(&self, value: &str) -> io::Result<()>;
}

/// File-backed storage: the key maps to `<dir>/cdna-kits.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        FileStorage { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl KitStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write next to the target and rename, so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = value.len(), "kit storage written");
        Ok(())
    }
}

/// In-memory storage, for embedding and tests. Writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    /// Storage pre-filled with `value` (e.g. a corrupt payload).
    pub fn with_value(value: impl Into<String>) -> Self {
        MemoryStorage { value: RefCell::new(Some(value.into())), fail_writes: Cell::new(false) }
    }

    /// Make every following write fail with a permission error.
    pub fn set_fail_writes(&self, fail: bool) { self.fail_writes.set(fail); }

    pub fn value(&self) -> Option<String> { self.value.borrow().clone() }
}

impl KitStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> { Ok(self.value()) }

    fn write(&self, value: &str) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "storage is read-only"));
        }
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn file_storage_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::in_dir(dir.path());
        assert!(s.read().unwrap().is_none());
    }

    #[test]
    fn file_storage_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStorage::in_dir(dir.path().join("nested"));
        s.write("[1]").unwrap();
        s.write("[2]").unwrap();
        assert_eq!(s.read().unwrap().as_deref(), Some("[2]"));
        assert!(s.path().ends_with("cdna-kits.json"));
    }

    #[test]
    fn memory_storage_can_fail_writes() {
        let s = MemoryStorage::with_value("[]");
        s.set_fail_writes(true);
        assert!(s.write("[1]").is_err());
        assert_eq!(s.value().as_deref(), Some("[]"));
    }
}
