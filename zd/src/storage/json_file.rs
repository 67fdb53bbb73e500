//! JSON file backend
//!
//! Layout:
//!
//! ```text
//! <data dir>/zendo/
//! ├── zendo-todos.json        # JSON array of Task records, newest first
//! ├── zendo-todos.json.lock   # advisory lock, held during load/save
//! └── zendo-todos.json.corrupt  # last unparseable file, if any
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{StorageError, TaskRepository};
use crate::domain::Task;

/// Storage key; also the default file stem
pub const STORAGE_KEY: &str = "zendo-todos";

/// Stores the task collection as one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "JsonFileRepository::new: called");
        Self { path }
    }

    /// Default location: `<data_local_dir>/zendo/zendo-todos.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zendo")
            .join(format!("{}.json", STORAGE_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STORAGE_KEY.into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn open_lock_file(&self) -> Result<(File, PathBuf), StorageError> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        Ok((file, lock_path))
    }

    /// Move an unparseable file aside so the next save cannot clobber it
    fn quarantine(&self) {
        let target = self.corrupt_path();
        match fs::rename(&self.path, &target) {
            Ok(()) => warn!("Moved unreadable task file to {}", target.display()),
            Err(e) => warn!("Failed to move unreadable task file aside: {}", e),
        }
    }
}

impl TaskRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        debug!(path = ?self.path, "JsonFileRepository::load: called");
        if !self.path.exists() {
            debug!("JsonFileRepository::load: no file, starting empty");
            return Ok(Vec::new());
        }

        let (lock, lock_path) = self.open_lock_file()?;
        FileExt::lock_shared(&lock).map_err(|source| StorageError::Lock {
            path: lock_path.clone(),
            source,
        })?;
        let content = fs::read(&self.path);
        let _ = FileExt::unlock(&lock);
        let content = content?;

        if content.iter().all(u8::is_ascii_whitespace) {
            debug!("JsonFileRepository::load: empty file");
            return Ok(Vec::new());
        }

        // Bad encoding is a parse error too, so it gets quarantined
        match serde_json::from_slice::<Vec<Task>>(&content) {
            Ok(tasks) => {
                info!("Loaded {} tasks from {}", tasks.len(), self.path.display());
                Ok(tasks)
            }
            Err(e) => {
                warn!("Task file {} is unreadable ({}), starting empty", self.path.display(), e);
                self.quarantine();
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        debug!(path = ?self.path, count = tasks.len(), "JsonFileRepository::save: called");
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let (lock, lock_path) = self.open_lock_file()?;
        FileExt::lock_exclusive(&lock).map_err(|source| StorageError::Lock { path: lock_path, source })?;

        let result = (|| -> Result<(), StorageError> {
            let tmp = NamedTempFile::new_in(&dir)?;
            {
                let mut writer = BufWriter::new(tmp.as_file());
                serde_json::to_writer_pretty(&mut writer, tasks)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            tmp.as_file().sync_all()?;
            tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
            Ok(())
        })();

        let _ = FileExt::unlock(&lock);
        debug!(ok = result.is_ok(), "JsonFileRepository::save: done");
        result
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
