//! Registry persisted as a single JSON document

use crate::memory::{drain_expired, merge_upsert};
use crate::persisted::{PersistedEntity, PersistedRegistry};
use crate::StoreError;
use rolodex_domain::{EntityRecord, Fingerprint, RegistryStore, UpsertOutcome};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// File-backed registry
///
/// The whole registry is rewritten on every mutation through a temp file
/// and a rename, so readers of the file only ever see a complete document.
/// The in-memory map is swapped only after the write succeeds.
#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    records: BTreeMap<Fingerprint, EntityRecord>,
}

impl JsonFileRegistry {
    /// Create a registry bound to `path` without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Create a registry and load whatever `path` already holds
    ///
    /// A missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut registry = Self::new(path);
        registry.load()?;
        Ok(registry)
    }

    /// Location of the registry file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<BTreeMap<Fingerprint, EntityRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No registry file at {}, starting empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let persisted: PersistedRegistry = serde_json::from_str(&content)?;
        persisted
            .into_iter()
            .map(|(fingerprint, entity)| {
                let record = entity.into_record(&fingerprint)?;
                Ok((record.fingerprint.clone(), record))
            })
            .collect()
    }

    /// Persist `records` and adopt them as the current state
    fn commit(&mut self, records: BTreeMap<Fingerprint, EntityRecord>) -> Result<(), StoreError> {
        let persisted: PersistedRegistry = records
            .values()
            .map(|r| (r.fingerprint.as_str().to_string(), PersistedEntity::from_record(r)))
            .collect();
        let payload = serde_json::to_vec_pretty(&persisted)?;

        if let Err(e) = write_atomic(&self.path, &payload) {
            error!("Registry write failed, keeping previous state: {}", e);
            return Err(e);
        }
        self.records = records;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => path.with_extension("tmp"),
    }
}

/// Write `bytes` to `<path>.tmp`, flush it to disk, then rename over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(bytes).map_err(|e| StoreError::io(&tmp, e))?;
    file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

impl RegistryStore for JsonFileRegistry {
    type Error = StoreError;

    fn load(&mut self) -> Result<usize, Self::Error> {
        self.records = self.read_file()?;
        info!(
            "Loaded {} registry entries from {}",
            self.records.len(),
            self.path.display()
        );
        Ok(self.records.len())
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, Self::Error> {
        Ok(self.records.get(fingerprint).cloned())
    }

    fn entries(&self) -> Result<Vec<EntityRecord>, Self::Error> {
        Ok(self.records.values().cloned().collect())
    }

    fn upsert(&mut self, record: EntityRecord) -> Result<UpsertOutcome, Self::Error> {
        let mut next = self.records.clone();
        let outcome = merge_upsert(&mut next, record);
        self.commit(next)?;
        Ok(outcome)
    }

    fn evict_expired(&mut self, now: u64) -> Result<Vec<Fingerprint>, Self::Error> {
        let mut next = self.records.clone();
        let evicted = drain_expired(&mut next, now);
        if evicted.is_empty() {
            return Ok(evicted);
        }
        self.commit(next)?;
        Ok(evicted)
    }

    fn len(&self) -> Result<usize, Self::Error> {
        Ok(self.records.len())
    }
}
