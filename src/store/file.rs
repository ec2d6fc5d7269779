//! JSON file store.
//!
//! The backing file holds a JSON array of entries. It is re-read on every
//! access so that values written out-of-band by an operator are picked up by
//! the next retry attempt without a restart.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::{ConfigEntry, Store, StoreError, StoreResult};

/// A store persisted as a single JSON document.
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles from this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created lazily on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Vec<ConfigEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let entries: Vec<ConfigEntry> = serde_json::from_reader(BufReader::new(file))?;
        Ok(entries)
    }

    fn save(&self, entries: &[ConfigEntry]) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn entry(&self, key: &str) -> StoreResult<Option<ConfigEntry>> {
        Ok(self.load()?.into_iter().find(|e| e.key == key))
    }

    fn put(&self, key: &str, value: &str, description: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut entries = self.load()?;
        let entry = ConfigEntry::new(key, value, description);
        match entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        self.save(&entries)?;
        tracing::debug!(key = %key, path = %self.path.display(), "Saved configuration entry");
        Ok(())
    }

    fn entries(&self) -> StoreResult<Vec<ConfigEntry>> {
        let mut entries = self.load()?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
