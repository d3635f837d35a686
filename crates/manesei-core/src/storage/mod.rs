//! Storage layer
//!
//! Notes live as plain files in a directory. The resolver only talks to the
//! [`NoteStore`] contract, so anything that can enumerate, open and write
//! identifiers (with a history of generations) can back the wiki.
//!
//! ## Generations
//!
//! - Generation `0` is the current file
//! - Positive generations name historic snapshots, oldest first

pub mod error;
pub mod fs;

use std::io::Read;

use chrono::{DateTime, Utc};

pub use error::{StorageError, StorageResult};
pub use fs::FileStore;

/// Generation number of the current version of a note
pub const CURRENT_GENERATION: u64 = 0;

/// Metadata returned by [`NoteStore::stat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMetadata {
    /// Size of the current file in bytes
    pub len: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Primitives the resolver and the editor need from a note store
pub trait NoteStore: Send + Sync {
    /// Enumerate identifiers below `prefix`
    ///
    /// Directories are included only when `include_dirs` is set, and nested
    /// directories are descended only when `recursive` is set.
    fn list(&self, prefix: &str, include_dirs: bool, recursive: bool)
        -> StorageResult<Vec<String>>;

    /// Open a generation of a note for reading
    fn open(&self, id: &str, generation: u64) -> StorageResult<Box<dyn Read + Send>>;

    /// Replace the contents of a note, creating it if needed
    fn write(&self, id: &str, contents: &[u8]) -> StorageResult<()>;

    /// Metadata of the current version of a note
    fn stat(&self, id: &str, follow_symlinks: bool) -> StorageResult<NoteMetadata>;

    /// Historic generations of a note, ascending
    fn history(&self, id: &str) -> StorageResult<Vec<u64>>;

    /// Delete the current version of a note
    fn remove(&self, id: &str) -> StorageResult<()>;

    /// Read a whole generation into a string
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than failing, so one
    /// stray binary file cannot break the document tree.
    fn read_to_string(&self, id: &str, generation: u64) -> StorageResult<String> {
        let mut reader = self.open(id, generation)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
