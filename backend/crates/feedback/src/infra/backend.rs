//! Startup-selected backends
//!
//! The object store and the session store are each chosen once when the
//! process starts; every call afterwards dispatches through these enums.

use crate::domain::entities::Turn;
use crate::domain::repository::SessionRepository;
use crate::domain::value_objects::SessionKey;
use crate::error::FeedbackResult;
use crate::infra::blob::BlobStore;
use crate::infra::kv::KvStore;
use crate::infra::local_fs::LocalFsStore;
use crate::infra::memory_session::MemorySessionStore;
use crate::infra::object_store::{ObjectStore, StorageError};

/// Durable object store
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local(LocalFsStore),
    Blob(BlobStore),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Local(_) => "local",
            StorageBackend::Blob(_) => "blob",
        }
    }
}

impl ObjectStore for StorageBackend {
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        match self {
            StorageBackend::Local(store) => store.write(key, body).await,
            StorageBackend::Blob(store) => store.write(key, body).await,
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            StorageBackend::Local(store) => store.read(key).await,
            StorageBackend::Blob(store) => store.read(key).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            StorageBackend::Local(store) => store.remove(key).await,
            StorageBackend::Blob(store) => store.remove(key).await,
        }
    }
}

/// Conversation history store
#[derive(Debug, Clone)]
pub enum SessionBackend {
    /// Bounded, process-local
    Memory(MemorySessionStore),
    /// Shares the durable object store with a short TTL
    Kv(KvStore<StorageBackend>),
}

impl SessionBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SessionBackend::Memory(_) => "memory",
            SessionBackend::Kv(_) => "kv",
        }
    }
}

impl SessionRepository for SessionBackend {
    async fn load(&self, key: &SessionKey) -> FeedbackResult<Vec<Turn>> {
        match self {
            SessionBackend::Memory(store) => store.load(key).await,
            SessionBackend::Kv(store) => store.load(key).await,
        }
    }

    async fn save(&self, key: &SessionKey, turns: &[Turn]) -> FeedbackResult<()> {
        match self {
            SessionBackend::Memory(store) => store.save(key, turns).await,
            SessionBackend::Kv(store) => store.save(key, turns).await,
        }
    }
}
