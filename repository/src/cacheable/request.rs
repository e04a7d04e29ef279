//! Request context
//!
//! The slice of the inbound request the cache layer looks at: the full URL
//! (part of every key) and query parameters (the skip-cache override).

use std::collections::BTreeMap;
use url::Url;

const FALSY: [&str; 5] = ["", "0", "false", "off", "no"];

/// Base that relative request URLs are resolved against
const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    full_url: String,
    params: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(full_url: &str) -> Self {
        Self {
            full_url: full_url.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Build a context from a URL, reading parameters from its query string
    ///
    /// Names and values are percent-decoded. Relative URLs such as
    /// `/users?page=2` are accepted; the stored URL is always `full_url` as given.
    pub fn from_url(full_url: &str) -> Self {
        let mut context = Self::new(full_url);
        let parsed = Url::parse(full_url)
            .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(full_url)));

        if let Ok(url) = parsed {
            for (name, value) in url.query_pairs() {
                context.params.insert(name.into_owned(), value.into_owned());
            }
        }
        context
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether `name` is present with a value other than "", "0", "false", "off" or "no"
    ///
    /// Values are compared trimmed and case-insensitively.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.param(name)
            .map(|value| {
                let value = value.trim().to_ascii_lowercase();
                !FALSY.contains(&value.as_str())
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_parsed() {
        let request = RequestContext::from_url("https://api.test/users?page=2&skipCache=1&flag#top");

        assert_eq!(request.full_url(), "https://api.test/users?page=2&skipCache=1&flag#top");
        assert_eq!(request.param("page"), Some("2"));
        assert_eq!(request.param("flag"), Some(""));
        assert!(request.is_truthy("skipCache"));
        assert!(!request.is_truthy("flag"));
        assert!(!request.is_truthy("absent"));
    }

    #[test]
    fn test_percent_encoded_params_are_decoded() {
        let encoded_name = RequestContext::from_url("https://api.test/users?skip%43ache=1");
        assert!(encoded_name.is_truthy("skipCache"));

        let encoded_false = RequestContext::from_url("https://api.test/users?skipCache=%66alse");
        assert_eq!(encoded_false.param("skipCache"), Some("false"));
        assert!(!encoded_false.is_truthy("skipCache"));

        let spaced = RequestContext::from_url("https://api.test/users?q=a%20b+c");
        assert_eq!(spaced.param("q"), Some("a b c"));
    }

    #[test]
    fn test_relative_urls_are_parsed() {
        let request = RequestContext::from_url("/users?skipCache=true&page=3");

        assert_eq!(request.full_url(), "/users?skipCache=true&page=3");
        assert_eq!(request.param("page"), Some("3"));
        assert!(request.is_truthy("skipCache"));
        assert!(RequestContext::from_url("/users").param("page").is_none());
    }

    #[test]
    fn test_falsy_values() {
        for value in ["0", "false", "FALSE", "off", "no", " "] {
            let request = RequestContext::new("/").with_param("skipCache", value);
            assert!(!request.is_truthy("skipCache"), "{:?} should be falsy", value);
        }
        for value in ["1", "true", "yes", "anything"] {
            let request = RequestContext::new("/").with_param("skipCache", value);
            assert!(request.is_truthy("skipCache"), "{:?} should be truthy", value);
        }
    }
}
