//! Object-store backed repositories
//!
//! [`KvStore`] serializes feedback records under `feedback/{id}.json` and
//! conversation histories under `conv/{key}.json` as JSON objects, on top of
//! any [`ObjectStore`] backend. Expiry is lazy: a record found past its
//! `expiresAt` is deleted on that read and reported as absent.

use crate::domain::entities::{
    FeedbackMetadata, FeedbackRecord, SanitizedFeedback, SessionRecord, Turn,
};
use crate::domain::repository::{FeedbackRepository, SessionRepository};
use crate::domain::value_objects::SessionKey;
use crate::error::FeedbackResult;
use crate::infra::object_store::{ObjectStore, StorageError};
use kernel::id::FeedbackId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn feedback_object_key(id: &FeedbackId) -> String {
    format!("feedback/{}.json", id)
}

pub fn session_object_key(key: &SessionKey) -> String {
    format!("conv/{}.json", key)
}

#[derive(Debug, Clone)]
pub struct KvStore<B> {
    backend: B,
    session_ttl: Duration,
}

impl<B> KvStore<B>
where
    B: ObjectStore + Sync,
{
    pub fn new(backend: B, session_ttl: Duration) -> Self {
        Self {
            backend,
            session_ttl,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(bytes) = self.backend.read(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let body = serde_json::to_vec(value).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, body).await
    }

    /// Live record, deleting it first if it has expired
    async fn live_record(&self, id: &FeedbackId) -> FeedbackResult<Option<FeedbackRecord>> {
        let key = feedback_object_key(id);
        let Some(record) = self.read_json::<FeedbackRecord>(&key).await? else {
            return Ok(None);
        };
        if record.is_expired() {
            self.backend.remove(&key).await?;
            tracing::debug!(feedback_id = %id, "Deleted expired feedback record");
            return Ok(None);
        }
        Ok(Some(record))
    }
}

impl<B> FeedbackRepository for KvStore<B>
where
    B: ObjectStore + Sync,
{
    async fn put(&self, record: &FeedbackRecord) -> FeedbackResult<()> {
        self.write_json(&feedback_object_key(&record.id), record)
            .await?;
        Ok(())
    }

    async fn get_metadata(&self, id: &FeedbackId) -> FeedbackResult<Option<FeedbackMetadata>> {
        Ok(self.live_record(id).await?.map(|r| r.metadata()))
    }

    async fn get_sanitized(&self, id: &FeedbackId) -> FeedbackResult<Option<SanitizedFeedback>> {
        Ok(self.live_record(id).await?.map(FeedbackRecord::into_sanitized))
    }

    async fn delete(&self, id: &FeedbackId) -> FeedbackResult<()> {
        self.backend.remove(&feedback_object_key(id)).await?;
        Ok(())
    }
}

impl<B> SessionRepository for KvStore<B>
where
    B: ObjectStore + Sync,
{
    async fn load(&self, key: &SessionKey) -> FeedbackResult<Vec<Turn>> {
        let object_key = session_object_key(key);
        let Some(record) = self.read_json::<SessionRecord>(&object_key).await? else {
            return Ok(Vec::new());
        };
        if record.is_expired() {
            self.backend.remove(&object_key).await?;
            tracing::debug!(session_key = %key, "Deleted expired session");
            return Ok(Vec::new());
        }
        Ok(record.turns)
    }

    async fn save(&self, key: &SessionKey, turns: &[Turn]) -> FeedbackResult<()> {
        let record = SessionRecord::new(key.to_string(), turns.to_vec(), self.session_ttl);
        self.write_json(&session_object_key(key), &record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Personalization;
    use crate::infra::local_fs::LocalFsStore;

    fn store(dir: &tempfile::TempDir, session_ttl: Duration) -> KvStore<LocalFsStore> {
        KvStore::new(LocalFsStore::new(dir.path()), session_ttl)
    }

    #[tokio::test]
    async fn test_record_json_layout() {
        let dir = tempfile::tempdir().unwrap();
        let kv = store(&dir, Duration::from_secs(60));
        let record = FeedbackRecord::new(
            "raw".into(),
            "clean".into(),
            Personalization::new(Some("Ann".into()), None, None),
            Duration::from_secs(60),
        );
        kv.put(&record).await.unwrap();

        let path = dir.path().join(format!("feedback/{}.json", record.id));
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(json["id"], record.id.as_str());
        assert_eq!(json["rawFeedback"], "raw");
        assert_eq!(json["sanitizedFeedback"], "clean");
        assert_eq!(json["senderName"], "Ann");
        assert!(json.get("recipientName").is_none());
        assert_eq!(json["expiresAt"], record.expires_at_ms);
    }

    #[tokio::test]
    async fn test_get_sanitized_never_returns_raw() {
        let dir = tempfile::tempdir().unwrap();
        let kv = store(&dir, Duration::from_secs(60));
        let record = FeedbackRecord::new(
            "the raw words".into(),
            "the themes".into(),
            Personalization::default(),
            Duration::from_secs(60),
        );
        kv.put(&record).await.unwrap();

        let sanitized = kv.get_sanitized(&record.id).await.unwrap().unwrap();
        assert_eq!(sanitized.text, "the themes");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = store(&dir, Duration::from_secs(60));
        let record = FeedbackRecord::new(
            "raw".into(),
            "clean".into(),
            Personalization::default(),
            Duration::from_secs(60),
        );
        kv.put(&record).await.unwrap();
        assert!(kv.get_metadata(&record.id).await.unwrap().is_some());

        kv.delete(&record.id).await.unwrap();
        kv.delete(&record.id).await.unwrap();

        assert!(kv.get_metadata(&record.id).await.unwrap().is_none());
        assert!(kv.get_sanitized(&record.id).await.unwrap().is_none());
        assert!(!dir.path().join(feedback_object_key(&record.id)).exists());
    }

    #[tokio::test]
    async fn test_corrupt_object_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let kv = store(&dir, Duration::from_secs(60));
        let id = FeedbackId::new();
        kv.backend()
            .write(&feedback_object_key(&id), b"not json".to_vec())
            .await
            .unwrap();

        let err = kv.get_metadata(&id).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::FeedbackError::Storage(StorageError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_roundtrip_and_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let key = SessionKey::new(FeedbackId::new());
        let turns = vec![Turn::user("hi"), Turn::assistant("hello")];

        let live = store(&dir, Duration::from_secs(3600));
        live.save(&key, &turns).await.unwrap();
        assert_eq!(live.load(&key).await.unwrap(), turns);

        let instant = store(&dir, Duration::ZERO);
        instant.save(&key, &turns).await.unwrap();
        assert!(instant.load(&key).await.unwrap().is_empty());
        assert!(!dir.path().join(session_object_key(&key)).exists());
    }
}
