use std::{collections::VecDeque, path::PathBuf, sync::Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::{
    db::Database,
    models::{IncomingPhoto, StoredPhoto},
};

/// Where received photos end up. Every append is atomic and gets a strictly
/// increasing sequence number.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn append(&self, photo: IncomingPhoto) -> Result<StoredPhoto>;
    async fn len(&self) -> Result<usize>;
    /// Retained photos, oldest first.
    async fn list(&self) -> Result<Vec<StoredPhoto>>;
}

struct MemoryInner {
    photos: VecDeque<StoredPhoto>,
    next_sequence: u64,
}

/// Process-local store. Unbounded by default, which means it grows for the
/// lifetime of the process; a bounded store drops the oldest photo instead.
pub struct InMemoryPhotoStore {
    inner: Mutex<MemoryInner>,
    capacity: Option<usize>,
}

impl InMemoryPhotoStore {
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                photos: VecDeque::new(),
                next_sequence: 1,
            }),
            capacity,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("photo store lock poisoned"))
    }
}

impl Default for InMemoryPhotoStore {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn append(&self, photo: IncomingPhoto) -> Result<StoredPhoto> {
        let mut inner = self.lock()?;
        let stored = StoredPhoto::from_incoming(photo, inner.next_sequence, Utc::now());
        inner.next_sequence += 1;
        inner.photos.push_back(stored.clone());
        if let Some(capacity) = self.capacity {
            while inner.photos.len() > capacity {
                inner.photos.pop_front();
            }
        }
        Ok(stored)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.lock()?.photos.len())
    }

    async fn list(&self) -> Result<Vec<StoredPhoto>> {
        Ok(self.lock()?.photos.iter().cloned().collect())
    }
}

/// Photos persisted in SQLite.
#[derive(Clone)]
pub struct SqlitePhotoStore {
    db: Database,
}

impl SqlitePhotoStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        Ok(Self {
            db: Database::new(path)?,
        })
    }
}

#[async_trait]
impl PhotoStore for SqlitePhotoStore {
    async fn append(&self, photo: IncomingPhoto) -> Result<StoredPhoto> {
        self.db.insert_photo(photo).await
    }

    async fn len(&self) -> Result<usize> {
        self.db.count_photos().await
    }

    async fn list(&self) -> Result<Vec<StoredPhoto>> {
        self.db.list_photos().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn photo(byte: u8) -> IncomingPhoto {
        IncomingPhoto::new(vec![byte; 8]).with_file_name(format!("{byte}.jpg"))
    }

    #[tokio::test]
    async fn unbounded_store_keeps_everything_in_order() {
        let store = InMemoryPhotoStore::unbounded();
        for byte in 0..10 {
            store.append(photo(byte)).await.unwrap();
        }
        let photos = store.list().await.unwrap();
        assert_eq!(photos.len(), 10);
        assert_eq!(
            photos.iter().map(|p| p.sequence).collect::<Vec<_>>(),
            (1..=10).collect::<Vec<u64>>()
        );
    }

    #[tokio::test]
    async fn bounded_store_evicts_oldest() {
        let store = InMemoryPhotoStore::bounded(3);
        for byte in 0..5 {
            store.append(photo(byte)).await.unwrap();
        }
        let sequences: Vec<u64> = store.list().await.unwrap().iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, vec![3, 4, 5]);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() {
        let store = Arc::new(InMemoryPhotoStore::unbounded());
        let mut handles = Vec::new();
        for byte in 0..50u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.append(photo(byte)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut sequences: Vec<u64> = store.list().await.unwrap().iter().map(|p| p.sequence).collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=50).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos.sqlite3");

        {
            let store = SqlitePhotoStore::open(path.clone()).unwrap();
            let first = store.append(photo(1)).await.unwrap();
            let second = store.append(photo(2)).await.unwrap();
            assert_eq!((first.sequence, second.sequence), (1, 2));
        }

        let store = SqlitePhotoStore::open(path).unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
        let third = store.append(photo(3)).await.unwrap();
        assert_eq!(third.sequence, 3);

        let photos = store.list().await.unwrap();
        assert_eq!(photos[0].file_name.as_deref(), Some("1.jpg"));
        assert_eq!(photos[2].bytes.as_ref(), &[3u8; 8]);
        assert_eq!(photos[2].size_bytes, 8);
    }
}
