//! Filesystem note store
//!
//! Each note is one file under the storage root, named by its identifier.
//! Before a note is overwritten or removed, the current file is copied into
//! `.history/<id>/<generation>`.
//!
//! Writes are atomic (write to a hidden temp file, then rename), so a
//! crashed request never leaves a half-written note behind. Writes through
//! one store are serialized, so every replaced version lands in history.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::error::{StorageError, StorageResult};
use super::{NoteMetadata, NoteStore, CURRENT_GENERATION};

/// Directory (relative to the root) holding historic generations
const HISTORY_DIR: &str = ".history";

/// Note store backed by a plain directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    /// Held across snapshot and rename
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::CreateDirectory {
            path: root.clone(),
            source,
        })?;

        info!("Opened note store at {:?}", root);
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn current_path(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn history_dir(&self, id: &str) -> PathBuf {
        self.root.join(HISTORY_DIR).join(id)
    }

    fn generation_path(&self, id: &str, generation: u64) -> PathBuf {
        if generation == CURRENT_GENERATION {
            self.current_path(id)
        } else {
            self.history_dir(id).join(generation.to_string())
        }
    }

    /// Copy the current file into history, returning the new generation
    fn snapshot(&self, id: &str) -> StorageResult<Option<u64>> {
        let current = self.current_path(id);
        if !current.is_file() {
            return Ok(None);
        }

        let dir = self.history_dir(id);
        fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;

        // create_new claims the generation even against another process
        let mut generation = self.history(id)?.last().map_or(1, |last| last + 1);
        let (target, mut snapshot) = loop {
            let target = self.generation_path(id, generation);
            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(file) => break (target, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => generation += 1,
                Err(e) => return Err(StorageError::from_write(e, target)),
            }
        };

        let mut source = File::open(&current)
            .map_err(|e| StorageError::from_read(e, current.clone(), id, CURRENT_GENERATION))?;
        io::copy(&mut source, &mut snapshot)
            .map_err(|e| StorageError::from_write(e, target.clone()))?;

        debug!("Saved generation {} of {}", generation, id);
        Ok(Some(generation))
    }
}

impl NoteStore for FileStore {
    fn list(
        &self,
        prefix: &str,
        include_dirs: bool,
        recursive: bool,
    ) -> StorageResult<Vec<String>> {
        let prefix = prefix.trim_matches('/');
        let base = if prefix.is_empty() {
            self.root.clone()
        } else {
            validate_id(prefix)?;
            self.root.join(prefix)
        };

        if !base.is_dir() {
            return Err(StorageError::NotFound {
                id: prefix.to_string(),
                generation: CURRENT_GENERATION,
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&base)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name().to_str()));

        let mut ids = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() && !include_dirs {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            ids.push(relative.to_string_lossy().replace('\\', "/"));
        }

        Ok(ids)
    }

    fn open(&self, id: &str, generation: u64) -> StorageResult<Box<dyn Read + Send>> {
        validate_id(id)?;
        let path = self.generation_path(id, generation);

        if path.is_dir() {
            return Err(StorageError::NotFound {
                id: id.to_string(),
                generation,
            });
        }

        let file = File::open(&path)
            .map_err(|e| StorageError::from_read(e, path.clone(), id, generation))?;
        Ok(Box::new(file))
    }

    fn write(&self, id: &str, contents: &[u8]) -> StorageResult<()> {
        validate_id(id)?;
        let path = self.current_path(id);
        if path.is_dir() {
            return Err(StorageError::IllegalPath { id: id.to_string() });
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.snapshot(id)?;
        atomic_write(&path, contents)?;

        info!("Wrote note {} ({} bytes)", id, contents.len());
        Ok(())
    }

    fn stat(&self, id: &str, follow_symlinks: bool) -> StorageResult<NoteMetadata> {
        validate_id(id)?;
        let path = self.current_path(id);

        let meta = if follow_symlinks {
            fs::metadata(&path)
        } else {
            fs::symlink_metadata(&path)
        }
        .map_err(|e| StorageError::from_read(e, path.clone(), id, CURRENT_GENERATION))?;

        if meta.is_dir() {
            return Err(StorageError::IllegalPath { id: id.to_string() });
        }

        let modified: DateTime<Utc> = meta.modified()?.into();
        Ok(NoteMetadata {
            len: meta.len(),
            modified,
        })
    }

    fn history(&self, id: &str) -> StorageResult<Vec<u64>> {
        validate_id(id)?;
        let dir = self.history_dir(id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::from_read(e, dir.clone(), id, CURRENT_GENERATION))?;

        let mut generations = Vec::new();
        for entry in entries {
            let entry = entry?;
            let parsed = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u64>().ok());
            if let Some(generation) = parsed.filter(|g| *g > CURRENT_GENERATION) {
                generations.push(generation);
            }
        }
        generations.sort_unstable();

        Ok(generations)
    }

    fn remove(&self, id: &str) -> StorageResult<()> {
        validate_id(id)?;
        let path = self.current_path(id);
        if !path.is_file() {
            return Err(StorageError::NotFound {
                id: id.to_string(),
                generation: CURRENT_GENERATION,
            });
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.snapshot(id)?;
        fs::remove_file(&path).map_err(|e| StorageError::from_write(e, path.clone()))?;

        info!("Removed note {}", id);
        Ok(())
    }
}

/// Reject identifiers that would escape the root or touch reserved files
fn validate_id(id: &str) -> StorageResult<()> {
    let illegal = id.is_empty()
        || id.starts_with('/')
        || id.contains('\\')
        || id.contains('\0')
        || id.split('/').any(|component| component.is_empty() || is_hidden(Some(component)));

    if illegal {
        return Err(StorageError::IllegalPath { id: id.to_string() });
    }
    Ok(())
}

/// Hidden entries (history, temp files) never count as notes
fn is_hidden(name: Option<&str>) -> bool {
    name.map_or(false, |n| n.starts_with('.'))
}

/// Write data atomically to a file
///
/// Writes to a uniquely named hidden temp file in the same directory, syncs
/// it, then renames it over the target.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })?;

    let mut file = NamedTempFile::new_in(parent)
        .map_err(|e| StorageError::from_write(e, parent.to_path_buf()))?;
    let temp_path = file.path().to_path_buf();

    file.write_all(data)
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;
    file.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.persist(path)
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}
