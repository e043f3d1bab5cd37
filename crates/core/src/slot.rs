//! Storage slots backing the record store.
//!
//! A slot holds one opaque string: the serialised record list. The store owns all parsing,
//! so a slot only has to read and replace its contents.

use crate::{StoreError, StoreResult};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// A single named value the record store reads and replaces wholesale.
pub trait StorageSlot: Send {
    /// Returns the slot contents, or `Ok(None)` if nothing has been written yet.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replaces the slot contents.
    ///
    /// Implementations must not leave a partially written value behind on failure.
    fn save(&mut self, contents: &str) -> io::Result<()>;

    /// Keeps a copy of contents the store could not parse, before they are overwritten.
    fn backup(&mut self, _contents: &str) -> io::Result<()> {
        Ok(())
    }
}

impl<T: StorageSlot + ?Sized> StorageSlot for Box<T> {
    fn load(&self) -> io::Result<Option<String>> {
        (**self).load()
    }

    fn save(&mut self, contents: &str) -> io::Result<()> {
        (**self).save(contents)
    }

    fn backup(&mut self, contents: &str) -> io::Result<()> {
        (**self).backup(contents)
    }
}

/// Slot stored as one JSON file on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the slot, so readers see
/// either the previous list or the new one.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the parent directory of `path` if needed and returns a slot for it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageDirCreation` if the directory cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::StorageDirCreation)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the slot file named `<slot>.bak`.
    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }

    fn staging_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl StorageSlot for FileSlot {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, contents: &str) -> io::Result<()> {
        let staging = self.staging_path();
        fs::write(&staging, contents)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        Ok(())
    }

    fn backup(&mut self, contents: &str) -> io::Result<()> {
        fs::write(self.backup_path(), contents)
    }
}

/// Slot kept in memory; used by tests and throwaway boards.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    contents: Option<String>,
    backup: Option<String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-populated with raw contents, valid JSON or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            backup: None,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn backup_contents(&self) -> Option<&str> {
        self.backup.as_deref()
    }
}

impl StorageSlot for MemorySlot {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> io::Result<()> {
        self.contents = Some(contents.to_owned());
        Ok(())
    }

    fn backup(&mut self, contents: &str) -> io::Result<()> {
        self.backup = Some(contents.to_owned());
        Ok(())
    }
}
