//! Core repocache functionality
//!
//! This module contains the `RepoCache` coordinator: it builds the shared cache
//! manager and key registry from configuration, wraps repositories with the
//! caching decorator and keeps named cached repositories.

use cache_system::{CacheManager, CacheParams, FileKeyRegistry, KeyRegistry, MemoryKeyRegistry};
use config::AppConfig;
use repository::{CachedRepository, Repository};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RepoCacheError;

/// Main coordinator that owns the cache collaborators and cached repositories
pub struct RepoCache {
    config: AppConfig,
    manager: Arc<CacheManager>,
    registry: Arc<dyn KeyRegistry>,
    repositories: HashMap<String, Box<dyn std::any::Any + Send + Sync>>,
}

impl std::fmt::Debug for RepoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoCache")
            .field("manager", &self.manager)
            .field("registry", &self.registry)
            .field("repositories", &self.repositories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RepoCache {
    /// Create a coordinator from configuration
    ///
    /// The key registry is persisted to `cache.key_registry_path` when set and
    /// kept in memory otherwise.
    pub fn new(config: AppConfig) -> Result<Self, RepoCacheError> {
        config.validate()?;

        let manager = Arc::new(CacheManager::from_config(config.cache.clone())?);
        let registry: Arc<dyn KeyRegistry> = match &config.cache.key_registry_path {
            Some(path) => Arc::new(FileKeyRegistry::new(path)),
            None => Arc::new(MemoryKeyRegistry::new()),
        };

        tracing::info!(
            store = %config.cache.repository,
            enabled = config.cache.enabled,
            minutes = config.cache.minutes,
            "repository cache initialized"
        );

        Ok(Self {
            config,
            manager,
            registry,
            repositories: HashMap::new(),
        })
    }

    /// Create a coordinator from `repocache.toml` or the file named by `REPOCACHE_CONFIG`
    pub fn from_env() -> Result<Self, RepoCacheError> {
        Self::new(AppConfig::load()?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    pub fn registry(&self) -> &Arc<dyn KeyRegistry> {
        &self.registry
    }

    /// Collaborators handed to every cached repository
    pub fn params(&self) -> CacheParams {
        CacheParams::new(Arc::clone(&self.manager), Arc::clone(&self.registry))
    }

    /// Wrap a repository with the caching decorator
    pub fn cached<R: Repository>(&self, repository: R) -> CachedRepository<R> {
        CachedRepository::new(repository, self.params())
    }

    /// Register a cached repository with a given name
    pub fn register_repository<R>(
        &mut self,
        name: String,
        repository: CachedRepository<R>,
    ) -> Result<(), RepoCacheError>
    where
        R: Repository + 'static,
    {
        if self.repositories.contains_key(&name) {
            return Err(RepoCacheError::RepositoryAlreadyRegistered(name));
        }

        self.repositories.insert(name, Box::new(repository));
        Ok(())
    }

    /// Get a registered cached repository by name
    pub fn get_repository<R>(&self, name: &str) -> Result<&CachedRepository<R>, RepoCacheError>
    where
        R: Repository + 'static,
    {
        self.repositories
            .get(name)
            .and_then(|repository| repository.downcast_ref::<CachedRepository<R>>())
            .ok_or_else(|| RepoCacheError::RepositoryNotFound(name.to_string()))
    }

    /// Get a mutable reference to a registered cached repository by name
    pub fn get_repository_mut<R>(
        &mut self,
        name: &str,
    ) -> Result<&mut CachedRepository<R>, RepoCacheError>
    where
        R: Repository + 'static,
    {
        self.repositories
            .get_mut(name)
            .and_then(|repository| repository.downcast_mut::<CachedRepository<R>>())
            .ok_or_else(|| RepoCacheError::RepositoryNotFound(name.to_string()))
    }

    /// List all registered repository names
    pub fn list_repositories(&self) -> Vec<&String> {
        self.repositories.keys().collect()
    }

    /// Remove a cached repository by name
    pub fn unregister_repository(&mut self, name: &str) -> Result<(), RepoCacheError> {
        self.repositories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepoCacheError::RepositoryNotFound(name.to_string()))
    }

    /// Forget every cached result recorded for `owner` (a repository name)
    ///
    /// Works without the repository instance, e.g. from invalidation tooling
    /// sharing a file key registry.
    pub async fn flush_repository(&self, owner: &str) -> Result<usize, RepoCacheError> {
        let keys = self.registry.forget_owner(owner).await?;

        let mut forgotten = 0;
        for key in &keys {
            if self.manager.forget(key).await? {
                forgotten += 1;
            }
        }

        tracing::info!(owner, forgotten, "repository cache flushed");
        Ok(forgotten)
    }
}
