use crate::errors::CacheError;
use crate::registry::KeyRegistry;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Process-local key registry
#[derive(Debug, Default)]
pub struct MemoryKeyRegistry {
    keys: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> CacheError {
        CacheError::General("key registry lock poisoned".to_string())
    }
}

#[async_trait]
impl KeyRegistry for MemoryKeyRegistry {
    async fn put_key(&self, owner: &str, key: &str) -> Result<(), CacheError> {
        let mut keys = self.keys.write().map_err(|_| Self::poisoned())?;
        keys.entry(owner.to_string())
            .or_default()
            .insert(key.to_string());
        Ok(())
    }

    async fn keys(&self, owner: &str) -> Result<Vec<String>, CacheError> {
        let keys = self.keys.read().map_err(|_| Self::poisoned())?;
        Ok(keys
            .get(owner)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn forget_owner(&self, owner: &str) -> Result<Vec<String>, CacheError> {
        let mut keys = self.keys.write().map_err(|_| Self::poisoned())?;
        Ok(keys
            .remove(owner)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keys_grouped_by_owner() {
        let registry = MemoryKeyRegistry::new();
        registry.put_key("Users", "Users@find-b").await.unwrap();
        registry.put_key("Users", "Users@all-a").await.unwrap();
        registry.put_key("Users", "Users@find-b").await.unwrap();
        registry.put_key("Posts", "Posts@all-c").await.unwrap();

        assert_eq!(
            registry.keys("Users").await.unwrap(),
            vec!["Users@all-a".to_string(), "Users@find-b".to_string()]
        );
        assert_eq!(registry.keys("Comments").await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_forget_owner_returns_keys() {
        let registry = MemoryKeyRegistry::new();
        registry.put_key("Users", "Users@all-a").await.unwrap();

        let forgotten = registry.forget_owner("Users").await.unwrap();
        assert_eq!(forgotten, vec!["Users@all-a".to_string()]);
        assert!(registry.keys("Users").await.unwrap().is_empty());
    }
}
