//! Remote blob object store
//!
//! Talks to an HTTP blob service:
//! - `PUT {api}/{key}` writes an object
//! - `GET {api}?prefix={key}` lists matching objects as
//!   `{"blobs": [{"url", "pathname"}]}`; the object body is then fetched
//!   from the returned `url`
//! - `DELETE {api}/{key}` removes an object
//!
//! Calls to the API are bearer-token authenticated.

use crate::infra::object_store::{ObjectStore, StorageError, validate_key};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Blob service settings
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub api_url: String,
    pub token: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    blobs: Vec<BlobEntry>,
}

#[derive(Debug, Deserialize)]
struct BlobEntry {
    url: String,
    pathname: String,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    http: reqwest::Client,
    config: Arc<BlobConfig>,
}

impl BlobStore {
    pub fn new(config: BlobConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    fn api(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.api(), key)
    }

    /// Download URL of the object stored exactly under `key`
    async fn locate(&self, key: &str) -> Result<Option<String>, StorageError> {
        let response = self
            .http
            .get(self.api())
            .bearer_auth(&self.config.token)
            .query(&[("prefix", key)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(key, status));
        }
        let listing: ListResponse = response.json().await?;
        Ok(listing
            .blobs
            .into_iter()
            .find(|blob| blob.pathname == key)
            .map(|blob| blob.url))
    }
}

fn status_error(key: &str, status: StatusCode) -> StorageError {
    StorageError::Status {
        key: key.to_string(),
        status: status.as_u16(),
    }
}

impl ObjectStore for BlobStore {
    async fn write(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self
            .http
            .put(self.object_url(key))
            .bearer_auth(&self.config.token)
            .header("content-type", "application/json")
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", "1")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(key, status));
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let Some(url) = self.locate(key).await? else {
            return Ok(None);
        };
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        // Listed but gone: removed between the two calls
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(key, status));
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self
            .http
            .delete(self.object_url(key))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(status_error(key, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::{Path, Query, State};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::Mutex;

    type Objects = Arc<Mutex<HashMap<String, Vec<u8>>>>;

    #[derive(Clone)]
    struct Mock {
        objects: Objects,
        base: String,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer secret")
    }

    async fn list(
        State(mock): State<Mock>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<serde_json::Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let prefix = query.get("prefix").cloned().unwrap_or_default();
        let blobs: Vec<_> = mock
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .map(|k| serde_json::json!({ "url": format!("{}/files/{}", mock.base, k), "pathname": k }))
            .collect();
        Ok(Json(serde_json::json!({ "blobs": blobs })))
    }

    async fn put(
        State(mock): State<Mock>,
        Path(key): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        mock.objects.lock().unwrap().insert(key, body.to_vec());
        StatusCode::OK
    }

    async fn delete(State(mock): State<Mock>, Path(key): Path<String>) -> StatusCode {
        match mock.objects.lock().unwrap().remove(&key) {
            Some(_) => StatusCode::OK,
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn fetch(State(mock): State<Mock>, Path(key): Path<String>) -> Result<Vec<u8>, StatusCode> {
        mock.objects
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn spawn_mock() -> (BlobStore, Objects) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let objects: Objects = Arc::default();
        let mock = Mock {
            objects: objects.clone(),
            base: base.clone(),
        };
        let router = Router::new()
            .route("/store", get(list))
            .route("/store/{*key}", axum::routing::put(put).delete(delete))
            .route("/files/{*key}", get(fetch))
            .with_state(mock);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let store = BlobStore::new(BlobConfig {
            api_url: format!("{}/store", base),
            token: "secret".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        (store, objects)
    }

    #[tokio::test]
    async fn test_write_read_remove() {
        let (store, objects) = spawn_mock().await;

        store
            .write("feedback/abc.json", br#"{"a":1}"#.to_vec())
            .await
            .unwrap();
        assert!(objects.lock().unwrap().contains_key("feedback/abc.json"));

        let body = store.read("feedback/abc.json").await.unwrap();
        assert_eq!(body, Some(br#"{"a":1}"#.to_vec()));

        store.remove("feedback/abc.json").await.unwrap();
        store.remove("feedback/abc.json").await.unwrap();
        assert_eq!(store.read("feedback/abc.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefix_match_must_be_exact() {
        let (store, objects) = spawn_mock().await;
        objects
            .lock()
            .unwrap()
            .insert("conv/abc.json.bak".to_string(), b"x".to_vec());

        assert_eq!(store.read("conv/abc.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_token_surfaces_status() {
        let (store, _) = spawn_mock().await;
        let store = BlobStore::new(BlobConfig {
            token: "wrong".to_string(),
            ..(*store.config).clone()
        })
        .unwrap();

        let err = store.read("feedback/abc.json").await.unwrap_err();
        assert!(matches!(err, StorageError::Status { status: 401, .. }));
    }
}
