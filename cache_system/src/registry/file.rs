//! JSON file backed key registry
//!
//! The file is the source of truth. Every change re-reads it under the instance
//! lock, applies the change and renames a fresh copy into place, so readers never
//! see a partially written index and writers taking turns keep each other's keys.

use crate::errors::CacheError;
use crate::registry::KeyRegistry;
use crate::trace_log;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type KeyIndex = BTreeMap<String, BTreeSet<String>>;

/// Key registry persisted as `{ "<owner>": ["<key>", ...] }`
#[derive(Debug)]
pub struct FileKeyRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyRegistry {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<KeyIndex, CacheError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(KeyIndex::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KeyIndex::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file next to the index and rename it into place
    async fn store(&self, index: &KeyIndex) -> Result<(), CacheError> {
        let content = serde_json::to_vec(index)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), std::io::Error> {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;

            let mut file = tempfile::NamedTempFile::new_in(&dir)?;
            file.write_all(&content)?;
            file.as_file().sync_all()?;
            file.persist(&path)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::General(format!("key registry write task failed: {}", e)))??;

        trace_log!("[REGISTRY] wrote {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyRegistry for FileKeyRegistry {
    async fn put_key(&self, owner: &str, key: &str) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut index = self.load().await?;

        let inserted = index
            .entry(owner.to_string())
            .or_default()
            .insert(key.to_string());
        if inserted {
            self.store(&index).await?;
        }
        Ok(())
    }

    async fn keys(&self, owner: &str) -> Result<Vec<String>, CacheError> {
        let index = self.load().await?;
        Ok(index
            .get(owner)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn forget_owner(&self, owner: &str) -> Result<Vec<String>, CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut index = self.load().await?;

        let removed: Vec<String> = index
            .remove(owner)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        if !removed.is_empty() {
            self.store(&index).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("repository-cache-keys.json");

        let registry = FileKeyRegistry::new(&path);
        registry.put_key("Users", "Users@find-1").await.unwrap();
        registry.put_key("Users", "Users@all-2").await.unwrap();

        let reopened = FileKeyRegistry::new(&path);
        assert_eq!(
            reopened.keys("Users").await.unwrap(),
            vec!["Users@all-2".to_string(), "Users@find-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_forget_owner_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");

        let registry = FileKeyRegistry::new(&path);
        registry.put_key("Users", "Users@find-1").await.unwrap();
        registry.put_key("Posts", "Posts@find-1").await.unwrap();

        let removed = registry.forget_owner("Users").await.unwrap();
        assert_eq!(removed, vec!["Users@find-1".to_string()]);

        let content = std::fs::read_to_string(&path).unwrap();
        let index: KeyIndex = serde_json::from_str(&content).unwrap();
        assert!(!index.contains_key("Users"));
        assert!(index.contains_key("Posts"));
    }

    #[tokio::test]
    async fn test_instances_sharing_a_file_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");

        let first = FileKeyRegistry::new(&path);
        let second = FileKeyRegistry::new(&path);
        first.put_key("Users", "Users@find-1").await.unwrap();
        second.put_key("Users", "Users@find-2").await.unwrap();
        first.put_key("Users", "Users@find-3").await.unwrap();

        assert_eq!(
            second.keys("Users").await.unwrap(),
            vec![
                "Users@find-1".to_string(),
                "Users@find-2".to_string(),
                "Users@find-3".to_string(),
            ]
        );

        // Forgetting through one instance removes keys the other one wrote
        assert_eq!(first.forget_owner("Users").await.unwrap().len(), 3);
        assert!(second.keys("Users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");

        let registry = FileKeyRegistry::new(&path);
        for i in 0..5 {
            registry.put_key("Users", &format!("Users@find-{}", i)).await.unwrap();
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        let index: KeyIndex = serde_json::from_str(&content).unwrap();
        assert_eq!(index["Users"].len(), 5);
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileKeyRegistry::new(dir.path().join("absent.json"));
        assert!(registry.keys("Users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, "{not json").unwrap();

        let registry = FileKeyRegistry::new(&path);
        assert!(matches!(
            registry.keys("Users").await.unwrap_err(),
            CacheError::SerializationError(_)
        ));
    }
}
