//! Cache policy and decision gate
//!
//! A policy is resolved once from configuration when a cached repository is
//! built; per-instance overrides sit on top of it. The gate is evaluated on every
//! call.

use super::request::RequestContext;
use config::CacheConfig;
use std::collections::BTreeSet;

/// Fallback lifetime when neither the instance nor configuration sets one
pub const DEFAULT_MINUTES: u64 = 30;

/// Write actions that may flush a repository's cached results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanAction {
    Create,
    Update,
    Delete,
}

impl CleanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleanAction::Create => "create",
            CleanAction::Update => "update",
            CleanAction::Delete => "delete",
        }
    }
}

/// Caching rules for one repository instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    enabled: bool,
    config_only: Option<BTreeSet<String>>,
    config_except: Option<BTreeSet<String>>,
    config_minutes: Option<u64>,
    only: Option<BTreeSet<String>>,
    except: Option<BTreeSet<String>>,
    minutes: Option<u64>,
    skip: bool,
    skip_param: String,
    clean_enabled: bool,
    clean_on_create: bool,
    clean_on_update: bool,
    clean_on_delete: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl CachePolicy {
    /// Resolve the configured rules; instance overrides start empty
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            config_only: config.allowed.only.clone(),
            config_except: config.allowed.except.clone(),
            config_minutes: Some(config.minutes).filter(|m| *m > 0),
            only: None,
            except: None,
            minutes: None,
            skip: false,
            skip_param: config.params.skip_cache.clone(),
            clean_enabled: config.clean.enabled,
            clean_on_create: config.clean.on.create,
            clean_on_update: config.clean.on.update,
            clean_on_delete: config.clean.on.delete,
        }
    }

    /// Instance allow-list, replacing the configured one
    pub fn with_only<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Instance deny-list, replacing the configured one
    pub fn with_except<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Instance lifetime, replacing the configured one
    pub fn with_minutes(mut self, minutes: u64) -> Self {
        self.minutes = Some(minutes).filter(|m| *m > 0);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn set_skip(&mut self, skip: bool) {
        self.skip = skip;
    }

    pub fn skip_param(&self) -> &str {
        &self.skip_param
    }

    fn effective_only(&self) -> Option<&BTreeSet<String>> {
        self.only.as_ref().or(self.config_only.as_ref())
    }

    fn effective_except(&self) -> Option<&BTreeSet<String>> {
        self.except.as_ref().or(self.config_except.as_ref())
    }

    /// Whether results of `method` may be cached
    ///
    /// With an allow-list a method must be listed (and not also denied); with
    /// only a deny-list it must not be listed; with neither every method is
    /// cacheable.
    pub fn allowed_cache(&self, method: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let denied = self
            .effective_except()
            .is_some_and(|except| except.contains(method));

        match self.effective_only() {
            Some(only) => only.contains(method) && !denied,
            None => !denied,
        }
    }

    /// Whether this instance or the current request asks for fresh data
    pub fn is_skipped_cache(&self, request: &RequestContext) -> bool {
        self.skip || request.is_truthy(&self.skip_param)
    }

    /// Effective lifetime in minutes: instance, then configuration, then 30
    pub fn minutes(&self) -> u64 {
        self.minutes
            .or(self.config_minutes)
            .unwrap_or(DEFAULT_MINUTES)
    }

    /// Whether a successful `action` should flush the repository's keys
    pub fn should_clean(&self, action: CleanAction) -> bool {
        self.clean_enabled
            && match action {
                CleanAction::Create => self.clean_on_create,
                CleanAction::Update => self.clean_on_update,
                CleanAction::Delete => self.clean_on_delete,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::AllowedMethods;

    const METHODS: [&str; 6] = [
        "all",
        "paginate",
        "find",
        "find_by_field",
        "find_where",
        "get_by_criteria",
    ];

    fn policy_with(allowed: AllowedMethods) -> CachePolicy {
        CachePolicy::from_config(&CacheConfig::default().with_allowed(allowed))
    }

    #[test]
    fn test_everything_cacheable_by_default() {
        let policy = CachePolicy::default();
        for method in METHODS {
            assert!(policy.allowed_cache(method));
        }
    }

    #[test]
    fn test_disabled_denies_everything() {
        let policy = CachePolicy::from_config(&CacheConfig::default().with_enabled(false));
        for method in METHODS {
            assert!(!policy.allowed_cache(method));
        }
    }

    #[test]
    fn test_only_list_is_an_allow_list() {
        let policy = policy_with(AllowedMethods::only(["find"]));

        assert!(policy.allowed_cache("find"));
        for method in METHODS.iter().filter(|m| **m != "find") {
            assert!(!policy.allowed_cache(method), "{} should not be cached", method);
        }
    }

    #[test]
    fn test_except_list_is_a_deny_list() {
        let policy = policy_with(AllowedMethods::except(["paginate"]));

        assert!(!policy.allowed_cache("paginate"));
        assert!(policy.allowed_cache("find"));
        assert!(policy.allowed_cache("all"));
    }

    #[test]
    fn test_except_wins_over_only() {
        let policy = policy_with(AllowedMethods {
            only: Some(["find", "all"].into_iter().map(String::from).collect()),
            except: Some(["all"].into_iter().map(String::from).collect()),
        });

        assert!(policy.allowed_cache("find"));
        assert!(!policy.allowed_cache("all"));
        assert!(!policy.allowed_cache("paginate"));
    }

    #[test]
    fn test_instance_override_replaces_config() {
        let policy = policy_with(AllowedMethods::only(["find"])).with_only(["all"]);

        assert!(policy.allowed_cache("all"));
        assert!(!policy.allowed_cache("find"));
    }

    #[test]
    fn test_minutes_resolution() {
        assert_eq!(CachePolicy::default().minutes(), 30);

        let configured = CachePolicy::from_config(&CacheConfig::default().with_minutes(5));
        assert_eq!(configured.minutes(), 5);
        assert_eq!(configured.clone().with_minutes(90).minutes(), 90);
        assert_eq!(configured.with_minutes(0).minutes(), 5);
    }

    #[test]
    fn test_skip_flag_and_request_param() {
        let mut policy = CachePolicy::default();
        let plain = RequestContext::new("https://api.test/users");
        let skipping = RequestContext::from_url("https://api.test/users?skipCache=true");

        assert!(!policy.is_skipped_cache(&plain));
        assert!(policy.is_skipped_cache(&skipping));

        policy.set_skip(true);
        assert!(policy.is_skipped_cache(&plain));
    }

    #[test]
    fn test_custom_skip_param_name() {
        let mut config = CacheConfig::default();
        config.params.skip_cache = "fresh".to_string();
        let policy = CachePolicy::from_config(&config);

        assert!(!policy.is_skipped_cache(&RequestContext::from_url("/users?skipCache=1")));
        assert!(policy.is_skipped_cache(&RequestContext::from_url("/users?fresh=1")));
    }

    #[test]
    fn test_clean_flags() {
        let mut config = CacheConfig::default();
        config.clean.on.update = false;
        let policy = CachePolicy::from_config(&config);

        assert!(policy.should_clean(CleanAction::Create));
        assert!(!policy.should_clean(CleanAction::Update));

        config.clean.enabled = false;
        let policy = CachePolicy::from_config(&config);
        assert!(!policy.should_clean(CleanAction::Delete));
    }
}
