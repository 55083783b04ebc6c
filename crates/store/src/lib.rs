//! Per-tenant campaign store.
//!
//! One mutual-exclusion lock per tenant serializes every access to that
//! tenant's campaign; a bounded LRU cache fronts the snapshot files. Reads
//! acquire, clone and release immediately; writes hold the lock through a
//! scoped [`WriteGuard`] until the guard is saved or dropped, so the lock
//! can never leak across an error path. Tenants are fully independent.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

use engine::Campaign;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

mod cache;
mod snapshot;

use cache::LruCache;

const CACHE_CAPACITY: usize = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("campaign {0} already exists")]
    Exists(u64),
    #[error("campaign {0} not found")]
    NotFound(u64),
    #[error("unsupported snapshot version \"{0}\"")]
    UnsupportedVersion(String),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Campaign store rooted at a data directory, one snapshot file per tenant.
///
/// Constructed once at startup and passed by reference into every command
/// handler; there is no ambient global instance.
#[derive(Debug)]
pub struct Store {
    data_dir: PathBuf,
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
    cache: Mutex<LruCache>,
}

impl Store {
    /// Opens the store, scanning the data directory for existing tenants.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Store, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;

        let mut locks = HashMap::new();
        let mut entries = tokio::fs::read_dir(&data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|name| name.parse::<u64>().ok()) else {
                tracing::debug!(?name, "skipping non-snapshot file");
                continue;
            };
            locks.insert(id, Arc::new(Mutex::new(())));
        }
        tracing::info!(campaigns = locks.len(), "tenant store opened");

        Ok(Store {
            data_dir,
            locks: Mutex::new(locks),
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        })
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.locks.lock().await.contains_key(&id)
    }

    /// Known tenant ids, ascending.
    pub async fn tenants(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.locks.lock().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Registers a new campaign and writes its first snapshot.
    pub async fn create(&self, campaign: Campaign) -> Result<(), StoreError> {
        let id = campaign.id;
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.contains_key(&id) {
                return Err(StoreError::Exists(id));
            }
            let lock = Arc::new(Mutex::new(()));
            locks.insert(id, Arc::clone(&lock));
            lock
        };

        let _permit = lock.lock_owned().await;
        if let Err(err) = self.persist(&campaign).await {
            self.locks.lock().await.remove(&id);
            return Err(err);
        }
        tracing::info!(id, "campaign created");
        Ok(())
    }

    /// Removes the snapshot, the lock and any cached state for a tenant.
    pub async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let lock = self.lock_for(id).await?;
        let _permit = lock.lock_owned().await;

        tokio::fs::remove_file(self.snapshot_path(id)).await?;
        self.locks.lock().await.remove(&id);
        self.cache.lock().await.remove(id);
        tracing::info!(id, "campaign deleted");
        Ok(())
    }

    /// Reads a tenant's campaign: acquire, clone, release immediately.
    ///
    /// Suitable for display operations that tolerate a concurrent mutation
    /// right after the read.
    pub async fn read(&self, id: u64) -> Result<Campaign, StoreError> {
        let lock = self.lock_for(id).await?;
        let _permit = lock.lock().await;
        self.load_locked(id).await
    }

    /// Acquires the tenant's lock for a read-modify-write cycle.
    ///
    /// The returned guard holds the lock across validation and mutation;
    /// call [`WriteGuard::save`] to persist, or drop the guard to release
    /// the lock and discard the unsaved changes.
    pub async fn write(&self, id: u64) -> Result<WriteGuard<'_>, StoreError> {
        let lock = self.lock_for(id).await?;
        let permit = lock.lock_owned().await;
        tracing::info!(id, "acquired write lock");

        let campaign = self.load_locked(id).await?;
        Ok(WriteGuard {
            store: self,
            campaign,
            _permit: permit,
        })
    }

    /// Maintenance entry point: adds a GM to an existing campaign.
    pub async fn add_gm(&self, id: u64, gm: u64) -> Result<(), StoreError> {
        let mut guard = self.write(id).await?;
        guard.add_gm(gm);
        guard.save().await
    }

    async fn lock_for(&self, id: u64) -> Result<Arc<Mutex<()>>, StoreError> {
        self.locks
            .lock()
            .await
            .get(&id)
            .map(Arc::clone)
            .ok_or(StoreError::NotFound(id))
    }

    async fn load_locked(&self, id: u64) -> Result<Campaign, StoreError> {
        if let Some(campaign) = self.cache.lock().await.get(id) {
            return Ok(campaign.clone());
        }

        tracing::info!(id, "reading campaign snapshot");
        let raw = match tokio::fs::read_to_string(self.snapshot_path(id)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(err) => return Err(err.into()),
        };

        let campaign = snapshot::decode(&raw)?;
        self.cache.lock().await.insert(campaign.clone());
        Ok(campaign)
    }

    async fn persist(&self, campaign: &Campaign) -> Result<(), StoreError> {
        tracing::info!(id = campaign.id, "writing campaign snapshot");
        let raw = snapshot::encode(campaign)?;

        let path = self.snapshot_path(campaign.id);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, &path).await?;

        self.cache.lock().await.insert(campaign.clone());
        Ok(())
    }

    fn snapshot_path(&self, id: u64) -> PathBuf {
        self.data_dir.join(id.to_string())
    }
}

/// Scoped write access to one tenant's campaign.
///
/// Holds the tenant lock for its whole lifetime; the lock is released when
/// the guard is consumed by [`WriteGuard::save`] or dropped on any other
/// exit path.
pub struct WriteGuard<'a> {
    store: &'a Store,
    campaign: Campaign,
    _permit: OwnedMutexGuard<()>,
}

impl WriteGuard<'_> {
    /// Persists the mutated campaign and refreshes the cache, then releases
    /// the tenant lock.
    pub async fn save(self) -> Result<(), StoreError> {
        let id = self.campaign.id;
        self.store.persist(&self.campaign).await?;
        tracing::info!(id, "released write lock");
        Ok(())
    }
}

impl Deref for WriteGuard<'_> {
    type Target = Campaign;

    fn deref(&self) -> &Self::Target {
        &self.campaign
    }
}

impl DerefMut for WriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.campaign
    }
}
