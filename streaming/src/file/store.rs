use crate::backing_store::BackingStore;
use crate::file::actions::{poll, remove_old, store};
use crate::file::index::{self, Index};
use crate::topic::validate_topic;
use async_trait::async_trait;
use msgd::error::{BrokerError, BrokerResult};
use msgd::utils::Timestamp;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Durable backing store: segmented append-only log files under `root`, one
/// subdirectory per topic, with a single `index` file at `root` tracking
/// what exists. Every public operation loads the index, runs its action
/// against it and the filesystem, then persists the index again — except
/// `poll`, which never mutates the index and so never needs to rewrite it.
pub struct FileBackingStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileBackingStore {
    pub async fn open(root: impl Into<PathBuf>) -> BrokerResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| BrokerError::io(format!("creating root {}", root.display()), e))?;
        let store = Self {
            root,
            lock: Mutex::new(()),
        };
        // A freshly constructed store whose root lacks an index file writes
        // an empty one before returning, per the on-disk format contract.
        if !tokio::fs::try_exists(store.index_path())
            .await
            .map_err(|e| BrokerError::io(format!("checking index at {}", store.index_path().display()), e))?
        {
            index::save(&store.index_path(), &Index::default()).await?;
        }
        Ok(store)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index")
    }
}

#[async_trait]
impl BackingStore for FileBackingStore {
    async fn store(&self, topic: &str, message: Vec<u8>) -> BrokerResult<u32> {
        validate_topic(topic)?;
        let _guard = self.lock.lock().await;
        let mut idx = index::load_if_present(&self.index_path()).await?;
        let message_number = store::store(&mut idx, &self.root, topic, message).await?;
        index::save(&self.index_path(), &idx).await?;
        Ok(message_number)
    }

    async fn poll(&self, topic: &str, read_from: u32) -> BrokerResult<(Vec<Vec<u8>>, u32)> {
        let _guard = self.lock.lock().await;
        let idx = index::load_if_present(&self.index_path()).await?;
        poll::poll(&idx, &self.root, topic, read_from).await
    }

    async fn remove_old_messages(&self, max_age: Timestamp) -> BrokerResult<usize> {
        let _guard = self.lock.lock().await;
        let mut idx = index::load_if_present(&self.index_path()).await?;
        let removed = remove_old::remove_old_messages(&mut idx, &self.root, max_age).await?;
        index::save(&self.index_path(), &idx).await?;
        Ok(removed)
    }

    async fn delete_contents(&self) -> BrokerResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| BrokerError::io(format!("reading root {}", self.root.display()), e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BrokerError::io("iterating root dir", e))?
        {
            let path = entry.path();
            if path == self.index_path() {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| BrokerError::io(format!("removing {}", path.display()), e))?;
            } else if entry
                .file_type()
                .await
                .map_err(|e| BrokerError::io("stat'ing root entry", e))?
                .is_dir()
            {
                tokio::fs::remove_dir_all(&path)
                    .await
                    .map_err(|e| BrokerError::io(format!("removing {}", path.display()), e))?;
            }
        }
        index::save(&self.index_path(), &Index::default()).await?;
        Ok(())
    }
}
