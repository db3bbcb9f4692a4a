//! # Delivery Sink Adapters
//!
//! Two independent "push named blob" paths: an HTTPS object-storage upload
//! and a mounted supplier transfer share. Neither participates in the
//! batch correctness invariants; failures are reported and retried by
//! operator action.

use crate::config::ObjectStorageConfig;
use async_trait::async_trait;
use pf_print_file::{DeliverySink, SinkError};
use std::path::{Path, PathBuf};
use tracing::info;

/// HTTPS object-storage sink.
pub struct ObjectStorageSink {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl ObjectStorageSink {
    /// Create a sink from configuration.
    #[must_use]
    pub fn new(config: &ObjectStorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        }
    }

    fn object_url(&self, file_name: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, file_name)
    }
}

#[async_trait]
impl DeliverySink for ObjectStorageSink {
    fn name(&self) -> &str {
        "object-storage"
    }

    async fn deliver(&self, file_name: &str, path: &Path) -> Result<(), SinkError> {
        let body = tokio::fs::read(path).await.map_err(|e| SinkError::Upload {
            sink: self.name().to_string(),
            reason: e.to_string(),
        })?;

        let mut request = self
            .client
            .put(self.object_url(file_name))
            .header("content-type", "application/octet-stream")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| SinkError::Upload {
            sink: self.name().to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(SinkError::Upload {
                sink: self.name().to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        info!(bucket = %self.bucket, file = %file_name, "Uploaded to object storage");
        Ok(())
    }
}

/// Mounted transfer-share sink.
///
/// The supplier's transfer endpoint is mounted as a local directory; a
/// delivery is one file copy into it.
pub struct TransferDirectorySink {
    directory: PathBuf,
}

impl TransferDirectorySink {
    /// Create a sink copying into a directory.
    #[must_use]
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl DeliverySink for TransferDirectorySink {
    fn name(&self) -> &str {
        "transfer-share"
    }

    async fn deliver(&self, file_name: &str, path: &Path) -> Result<(), SinkError> {
        let destination = self.directory.join(file_name);
        tokio::fs::copy(path, &destination)
            .await
            .map_err(|e| SinkError::Upload {
                sink: self.name().to_string(),
                reason: e.to_string(),
            })?;

        info!(destination = %destination.display(), "Copied to transfer share");
        Ok(())
    }
}
