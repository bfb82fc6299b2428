use crate::errors::{ClientError, ClientResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>, entries: BTreeMap<String, String>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    /// Loads the store from `path`. A missing or unreadable file yields an
    /// empty store.
    pub async fn open(path: &Path) -> Self {
        let entries = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse storage file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read storage file: {err}");
                BTreeMap::new()
            }
        };
        Self::new(path, entries)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub async fn set(&mut self, key: &str, value: impl Into<String>) -> ClientResult<()> {
        self.entries.insert(key.to_string(), value.into());
        self.persist().await
    }

    pub async fn remove(&mut self, key: &str) -> ClientResult<()> {
        if self.entries.remove(key).is_some() {
            self.persist().await?;
        }
        Ok(())
    }

    async fn persist(&self) -> ClientResult<()> {
        let payload = serde_json::to_vec_pretty(&self.entries)
            .map_err(|err| ClientError::Storage(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}
