//! Caching decorator
//!
//! `CachedRepository` implements `Repository` by memoizing the wrapped
//! repository's reads and forwarding everything else.

use super::key::{derive_key, serialize_criterion};
use super::policy::{CachePolicy, CleanAction};
use super::request::RequestContext;
use crate::errors::RepositoryError;
use crate::query_builder::{Page, QueryFilter};
use crate::traits::{Criterion, Repository, RepositoryWriter};
use async_trait::async_trait;
use cache_system::{debug_log, CacheParams};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Repository decorator that caches read results
pub struct CachedRepository<R> {
    inner: R,
    policy: CachePolicy,
    params: CacheParams,
    request: RequestContext,
}

impl<R: Repository> std::fmt::Debug for CachedRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("repository", &self.inner.repository_name())
            .field("policy", &self.policy)
            .field("request", &self.request)
            .finish()
    }
}

impl<R: Repository + Clone> Clone for CachedRepository<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            policy: self.policy.clone(),
            params: self.params.clone(),
            request: self.request.clone(),
        }
    }
}

impl<R: Repository> CachedRepository<R> {
    /// Wrap `inner`, resolving the policy from the manager's configuration
    pub fn new(inner: R, params: CacheParams) -> Self {
        let policy = CachePolicy::from_config(params.manager.config());
        Self {
            inner,
            policy,
            params,
            request: RequestContext::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Same repository and policy, bound to another request
    pub fn for_request(&self, request: RequestContext) -> Self
    where
        R: Clone,
    {
        self.clone().with_request(request)
    }

    pub fn set_request(&mut self, request: RequestContext) {
        self.request = request;
    }

    /// Bypass the cache for every call on this instance until reset
    pub fn skip_cache(&mut self, skip: bool) -> &mut Self {
        self.policy.set_skip(skip);
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn allowed_cache(&self, method: &str) -> bool {
        self.policy.allowed_cache(method)
    }

    pub fn is_skipped_cache(&self) -> bool {
        self.policy.is_skipped_cache(&self.request)
    }

    fn bypass(&self, method: &str) -> bool {
        let bypass = !self.allowed_cache(method) || self.is_skipped_cache();
        if bypass {
            debug_log!(
                "[CACHE] bypass {}@{}",
                self.inner.repository_name(),
                method
            );
        }
        bypass
    }

    /// Derive the key of a call and record it in the key registry
    pub async fn get_cache_key<A>(&self, method: &str, args: &A) -> Result<String, RepositoryError>
    where
        A: Serialize + Sync + ?Sized,
    {
        let owner = self.inner.repository_name();
        let criteria: &[Arc<dyn Criterion>] = if self.inner.is_skipping_criteria() {
            &[]
        } else {
            self.inner.criteria()
        };
        let key = derive_key(&owner, method, args, criteria, &self.request)?;
        self.params.registry.put_key(&owner, &key).await?;
        Ok(key)
    }

    /// Forget every cached result this repository produced, returning how many
    pub async fn flush_cache(&self) -> Result<usize, RepositoryError> {
        let owner = self.inner.repository_name();
        // Take the keys out in one step so a key registered meanwhile stays indexed
        let keys = self.params.registry.forget_owner(&owner).await?;

        let mut forgotten = 0;
        for key in &keys {
            if self.params.manager.forget(key).await? {
                forgotten += 1;
            }
        }

        debug_log!(
            "[CACHE] flushed {} of {} keys for {}",
            forgotten,
            keys.len(),
            owner
        );
        Ok(forgotten)
    }

    async fn clean(&self, action: CleanAction) {
        if !self.policy.should_clean(action) {
            return;
        }

        // The write already succeeded; a failed flush only leaves stale entries behind
        if let Err(e) = self.flush_cache().await {
            tracing::warn!(
                repository = %self.inner.repository_name(),
                action = action.as_str(),
                error = %e,
                "failed to clean repository cache"
            );
        }
    }
}

#[async_trait]
impl<R: Repository> Repository for CachedRepository<R> {
    type Model = R::Model;
    type Id = R::Id;

    fn repository_name(&self) -> String {
        self.inner.repository_name()
    }

    async fn all(&self, columns: &[String]) -> Result<Vec<Self::Model>, RepositoryError> {
        if self.bypass("all") {
            return self.inner.all(columns).await;
        }

        let key = self.get_cache_key("all", &(columns,)).await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || self.inner.all(columns))
            .await
    }

    async fn paginate(
        &self,
        per_page: Option<u32>,
        page: u32,
        columns: &[String],
    ) -> Result<Page<Self::Model>, RepositoryError> {
        if self.bypass("paginate") {
            return self.inner.paginate(per_page, page, columns).await;
        }

        let key = self
            .get_cache_key("paginate", &(per_page, page, columns))
            .await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || {
                self.inner.paginate(per_page, page, columns)
            })
            .await
    }

    async fn find(
        &self,
        id: &Self::Id,
        columns: &[String],
    ) -> Result<Self::Model, RepositoryError> {
        if self.bypass("find") {
            return self.inner.find(id, columns).await;
        }

        let key = self.get_cache_key("find", &(id, columns)).await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || self.inner.find(id, columns))
            .await
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        columns: &[String],
    ) -> Result<Vec<Self::Model>, RepositoryError> {
        if self.bypass("find_by_field") {
            return self.inner.find_by_field(field, value, columns).await;
        }

        let key = self
            .get_cache_key("find_by_field", &(field, value, columns))
            .await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || {
                self.inner.find_by_field(field, value, columns)
            })
            .await
    }

    async fn find_where(
        &self,
        filters: &[QueryFilter],
        columns: &[String],
    ) -> Result<Vec<Self::Model>, RepositoryError> {
        if self.bypass("find_where") {
            return self.inner.find_where(filters, columns).await;
        }

        let key = self.get_cache_key("find_where", &(filters, columns)).await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || {
                self.inner.find_where(filters, columns)
            })
            .await
    }

    async fn get_by_criteria(
        &self,
        criterion: Arc<dyn Criterion>,
    ) -> Result<Vec<Self::Model>, RepositoryError> {
        if self.bypass("get_by_criteria") {
            return self.inner.get_by_criteria(criterion).await;
        }

        let repr = serialize_criterion(criterion.as_ref())?;
        let key = self.get_cache_key("get_by_criteria", &(repr,)).await?;
        self.params
            .manager
            .remember(&key, self.policy.minutes(), || {
                self.inner.get_by_criteria(criterion)
            })
            .await
    }

    fn criteria(&self) -> &[Arc<dyn Criterion>] {
        self.inner.criteria()
    }

    fn push_criterion(&mut self, criterion: Arc<dyn Criterion>) {
        self.inner.push_criterion(criterion);
    }

    fn reset_criteria(&mut self) {
        self.inner.reset_criteria();
    }

    fn skip_criteria(&mut self, skip: bool) {
        self.inner.skip_criteria(skip);
    }

    fn is_skipping_criteria(&self) -> bool {
        self.inner.is_skipping_criteria()
    }
}

#[async_trait]
impl<R: RepositoryWriter> RepositoryWriter for CachedRepository<R> {
    async fn create(&self, attributes: Value) -> Result<Self::Model, RepositoryError> {
        let created = self.inner.create(attributes).await?;
        self.clean(CleanAction::Create).await;
        Ok(created)
    }

    async fn update(
        &self,
        id: &Self::Id,
        attributes: Value,
    ) -> Result<Self::Model, RepositoryError> {
        let updated = self.inner.update(id, attributes).await?;
        self.clean(CleanAction::Update).await;
        Ok(updated)
    }

    async fn delete(&self, id: &Self::Id) -> Result<bool, RepositoryError> {
        let deleted = self.inner.delete(id).await?;
        self.clean(CleanAction::Delete).await;
        Ok(deleted)
    }
}
