//! Contract descriptor sources

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the raw JSON descriptor of the pools contract.
#[async_trait]
pub trait ContractSource: Send + Sync {
    async fn read_descriptor(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct FileContractSource {
    path: PathBuf,
}

impl FileContractSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ContractSource for FileContractSource {
    async fn read_descriptor(&self) -> Result<String> {
        debug!(path = %self.path.display(), "Reading contract descriptor");
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read contract descriptor {}", self.path.display()))
    }
}

/// Descriptor held in memory, e.g. embedded at build time.
#[derive(Debug, Clone)]
pub struct StaticContractSource {
    json: String,
}

impl StaticContractSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

#[async_trait]
impl ContractSource for StaticContractSource {
    async fn read_descriptor(&self) -> Result<String> {
        Ok(self.json.clone())
    }
}
