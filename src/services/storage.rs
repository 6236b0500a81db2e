//! Object storage for event images

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::sanitize_filename;

/// Upload contract; returns the public URL of the stored object
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        object_name: &str,
        content: &[u8],
        size_hint: u64,
        content_type: &str,
    ) -> Result<String>;
}

/// Writes objects under a local directory served at `public_base_url`
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.upload_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Stored names are sanitized and prefixed with the upload timestamp
    fn stored_name(object_name: &str) -> String {
        format!(
            "{}_{}",
            Utc::now().format("%Y%m%d%H%M%S%3f"),
            sanitize_filename(object_name)
        )
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        object_name: &str,
        content: &[u8],
        size_hint: u64,
        content_type: &str,
    ) -> Result<String> {
        if object_name.trim().is_empty() {
            return Err(EventManagerError::validation("Object name is required"));
        }
        debug!(object_name = %object_name, size_hint, content_type = %content_type, "Uploading object");

        tokio::fs::create_dir_all(&self.root).await?;
        let name = Self::stored_name(object_name);
        let mut file = tokio::fs::File::create(self.root.join(&name)).await?;
        file.write_all(content).await?;
        file.flush().await?;

        let url = format!("{}/{}", self.public_base_url, name);
        info!(url = %url, bytes = content.len(), "Object uploaded");
        Ok(url)
    }
}
