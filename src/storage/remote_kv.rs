//! Remote-KV storage variant — a thin client for a Consul-like HTTP KV
//! store: `GET/PUT/DELETE <prefix>/<name>`, with `<prefix>/?keys` used for
//! listing.

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use super::{Backend, BackendId, RemoteKvConfig};
use crate::error::StashError;
use crate::record::Document;

pub struct RemoteKvStorage {
    client: reqwest::blocking::Client,
    base_url: String,
    prefix: String,
}

/// One entry of a Consul-style `GET` response: the value is Base64-encoded
/// JSON, never returned inline.
#[derive(Debug, Deserialize)]
struct KvEntry {
    #[serde(rename = "Value")]
    value: String,
}

impl RemoteKvStorage {
    pub fn new(config: RemoteKvConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: format!("http://{}:{}/v1/kv", config.host, config.port),
            prefix: config.prefix,
        }
    }

    fn key_url(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.prefix, name)
    }

    fn prefix_url(&self) -> String {
        format!("{}/{}", self.base_url, self.prefix)
    }

    fn request_failed(e: reqwest::Error) -> StashError {
        StashError::BackendFailure(anyhow::anyhow!("remote-kv request failed: {e}"))
    }
}

impl Backend for RemoteKvStorage {
    fn init(&self) -> Result<(), StashError> {
        // The remote store has no schema to create; mirror the "already
        // initialized" check by probing whether any key under the prefix
        // already exists.
        let existing = self.list()?;
        if !existing.is_empty() {
            return Err(StashError::AlreadyInitialized(self.prefix_url()));
        }
        Ok(())
    }

    fn put(&self, doc: &Document) -> Result<BackendId, StashError> {
        let body = serde_json::to_vec(doc)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("failed to serialise record: {e}")))?;

        self.client
            .put(self.key_url(&doc.name))
            .body(body)
            .send()
            .map_err(Self::request_failed)?
            .error_for_status()
            .map_err(Self::request_failed)?;

        // Unlike the integer ids of the local backends, the remote store
        // has no insertion counter: it hands back the record's own name.
        Ok(doc.name.clone())
    }

    fn get(&self, name: &str) -> Result<Option<Document>, StashError> {
        let response = self
            .client
            .get(self.key_url(name))
            .send()
            .map_err(Self::request_failed)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(Self::request_failed)?;

        let entries: Vec<KvEntry> = response
            .json()
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("malformed remote-kv response: {e}")))?;

        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };

        let raw = general_purpose::STANDARD
            .decode(entry.value)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("malformed remote-kv value encoding: {e}")))?;
        let doc: Document = serde_json::from_slice(&raw)
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("malformed remote-kv record: {e}")))?;
        Ok(Some(doc))
    }

    fn list(&self) -> Result<Vec<Document>, StashError> {
        let response = self
            .client
            .get(format!("{}/?keys", self.prefix_url()))
            .send()
            .map_err(Self::request_failed)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = response.error_for_status().map_err(Self::request_failed)?;

        let keys: Vec<String> = response
            .json()
            .map_err(|e| StashError::BackendFailure(anyhow::anyhow!("malformed remote-kv keys response: {e}")))?;

        let mut docs = Vec::with_capacity(keys.len());
        for full_key in keys {
            let name = full_key
                .strip_prefix(&format!("{}/", self.prefix))
                .unwrap_or(&full_key)
                .to_string();
            if let Some(doc) = self.get(&name)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn delete(&self, name: &str) -> Result<bool, StashError> {
        let response = self
            .client
            .delete(self.key_url(name))
            .send()
            .map_err(Self::request_failed)?;

        match response.status() {
            reqwest::StatusCode::OK => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(StashError::BackendFailure(anyhow::anyhow!(
                "remote-kv delete returned unexpected status {status}"
            ))),
        }
    }
}
