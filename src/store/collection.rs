use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, warn};
use uuid::Uuid;

use super::StoreError;

pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> Uuid;

    /// Subdirectory the record is filed under, if the collection is partitioned.
    fn partition(&self) -> Option<Uuid> {
        None
    }
}

/// Directory holding one `<id>.json` file per record, optionally grouped
/// into `<partition>/` subdirectories.
pub struct Collection<T> {
    dir: PathBuf,
    writer: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub async fn open(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::io("create_dir_all", &dir, source))?;
        Ok(Self {
            dir,
            writer: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    /// Serializes read-modify-write sequences on this collection.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    fn dir_for(&self, partition: Option<Uuid>) -> PathBuf {
        match partition {
            Some(key) => self.dir.join(key.to_string()),
            None => self.dir.clone(),
        }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Writes through a temp file so readers never see a partial record.
    pub async fn put(&self, record: &T) -> Result<(), StoreError> {
        let dir = self.dir_for(record.partition());
        if record.partition().is_some() {
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| StoreError::io("create_dir_all", &dir, source))?;
        }
        let path = dir.join(format!("{}.json", record.id()));
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(record)?;
        fs::write(&tmp, data)
            .await
            .map_err(|source| StoreError::io("write", &tmp, source))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::io("rename", &path, source))?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        self.read_file(&self.path_for(id)).await
    }

    /// Records at the top level of the collection.
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.read_records(&self.dir).await
    }

    /// Records filed under one partition; empty if it has none yet.
    pub async fn all_in(&self, partition: Uuid) -> Result<Vec<T>, StoreError> {
        self.read_records(&self.dir_for(Some(partition))).await
    }

    async fn read_records(&self, dir: &Path) -> Result<Vec<T>, StoreError> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::io("read_dir", dir, source)),
        };
        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StoreError::io("read_dir", dir, source))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = self.read_file(&path).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn read_file(&self, path: &Path) -> Result<Option<T>, StoreError> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::io("read", path, source)),
        };
        match serde_json::from_slice::<T>(&data) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                self.quarantine(path, &e).await?;
                Ok(None)
            }
        }
    }

    /// Moves an unparseable record to `<name>.corrupt` and keeps going.
    async fn quarantine(&self, path: &Path, cause: &serde_json::Error) -> Result<(), StoreError> {
        let target = path.with_extension("json.corrupt");
        warn!(
            path = %path.display(),
            moved_to = %target.display(),
            error = %cause,
            "corrupt record quarantined"
        );
        match fs::rename(path, &target).await {
            Ok(()) => Ok(()),
            // another reader got there first
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::io("rename", path, source)),
        }
    }
}
