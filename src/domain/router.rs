use std::collections::HashMap;
use tracing::{debug, info};

use super::{domain_key, Domain};
use crate::router::RouterError;

/// All virtual hosts, keyed by lower-cased `host[:port]`
///
/// Built once, then shared read-only. A reload builds a new `Router` and
/// swaps it in as a whole (see [`crate::hot_reload::RouterHandle`]).
#[derive(Debug, Clone, Default)]
pub struct Router {
    domains: HashMap<String, Domain>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain under [`Domain::key`].
    ///
    /// # Errors
    ///
    /// [`RouterError::DuplicateDomain`] when the key is already taken.
    pub fn add_domain(&mut self, domain: Domain) -> Result<(), RouterError> {
        let key = domain.key();
        if self.domains.contains_key(&key) {
            return Err(RouterError::DuplicateDomain { key });
        }

        info!(
            domain = %key,
            name = %domain.name,
            routes_count = domain.table().len(),
            methods = ?domain.table().methods(),
            redirect_trailing_slash = domain.redirect_trailing_slash,
            method_not_allowed = domain.method_not_allowed,
            auto_options = domain.auto_options,
            redirect_fixed_path = domain.redirect_fixed_path,
            cors_enabled = domain.cors_enabled,
            "Domain routing table loaded"
        );

        self.domains.insert(key, domain);
        Ok(())
    }

    /// Find the domain serving `host` (the request's `Host` header value).
    ///
    /// Matching is exact and case-insensitive. A host carrying the scheme
    /// default port (`:80` or `:443`) also matches a domain registered
    /// without a port.
    #[must_use]
    pub fn lookup(&self, host: &str) -> Option<&Domain> {
        let key = domain_key(host, None);
        if let Some(domain) = self.domains.get(&key) {
            return Some(domain);
        }

        let bare = key
            .strip_suffix(":80")
            .or_else(|| key.strip_suffix(":443"));
        let found = bare.and_then(|bare| self.domains.get(bare));
        if found.is_none() {
            debug!(host = %host, "No domain configured for host");
        }
        found
    }

    /// Domains sorted by key.
    #[must_use]
    pub fn domains(&self) -> Vec<&Domain> {
        let mut keys: Vec<&String> = self.domains.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| &self.domains[k]).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
