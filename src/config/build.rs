use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::load::load_config;
use super::types::{DomainConfig, RouteConfig, RouteEntry};
use crate::domain::{Domain, Router};
use crate::router::{Route, RouterError};

/// Conventional action for a method when a route does not name one.
///
/// Methods outside the table use their own name in title case
/// (`CONNECT` becomes `Connect`).
#[must_use]
pub fn default_action(method: &str) -> String {
    match method {
        "GET" => "Index".to_string(),
        "POST" => "Create".to_string(),
        "PUT" | "PATCH" => "Update".to_string(),
        "DELETE" => "Delete".to_string(),
        "OPTIONS" => "Options".to_string(),
        "HEAD" => "Head".to_string(),
        "TRACE" => "Trace".to_string(),
        other => {
            let lower = other.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

struct Parent<'a> {
    name: &'a str,
    path: &'a str,
    controller: Option<&'a str>,
}

fn join_path(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix.trim_end_matches('/'), path)
}

fn invalid(route: &str, reason: &str) -> RouterError {
    RouterError::InvalidRouteConfig {
        route: route.to_string(),
        reason: reason.to_string(),
    }
}

/// Flatten nested route entries into registrable routes, parents first,
/// siblings in name order.
///
/// # Errors
///
/// A route without a path, with a path not starting with `/`, or without a
/// controller (own or inherited).
pub fn flatten_routes(routes: &BTreeMap<String, RouteEntry>) -> Result<Vec<Route>, RouterError> {
    let mut out = Vec::new();
    flatten_into(routes, None, &mut out)?;
    Ok(out)
}

fn flatten_into(
    routes: &BTreeMap<String, RouteEntry>,
    parent: Option<&Parent<'_>>,
    out: &mut Vec<Route>,
) -> Result<(), RouterError> {
    for (name, entry) in routes {
        let path = entry
            .path
            .as_deref()
            .ok_or_else(|| invalid(name, "missing path"))?;
        if !path.starts_with('/') {
            return Err(RouterError::InvalidPath {
                route: name.clone(),
                path: path.to_string(),
            });
        }

        let full_path = match parent {
            Some(p) => join_path(p.path, path),
            None => path.to_string(),
        };
        let controller = entry
            .controller
            .as_deref()
            .or_else(|| parent.and_then(|p| p.controller))
            .ok_or_else(|| invalid(name, "missing controller"))?;
        let method = entry
            .method
            .as_deref()
            .unwrap_or("GET")
            .trim()
            .to_ascii_uppercase();

        // A route with nested routes is only a prefix unless it names an action.
        if entry.routes.is_empty() || entry.action.is_some() {
            let action = entry
                .action
                .clone()
                .unwrap_or_else(|| default_action(&method));
            out.push(Route {
                name: name.clone(),
                path: full_path.clone(),
                method,
                controller: controller.to_string(),
                action,
                parent: parent.map(|p| p.name.to_string()),
            });
        }

        if !entry.routes.is_empty() {
            let this = Parent {
                name,
                path: &full_path,
                controller: Some(controller),
            };
            flatten_into(&entry.routes, Some(&this), out)?;
        }
    }
    Ok(())
}

/// Build one [`Domain`] from its configuration.
///
/// # Errors
///
/// Any flattening or registration error.
pub fn build_domain(id: &str, config: &DomainConfig) -> Result<Domain, RouterError> {
    let mut domain = Domain::new(
        config.name.clone().unwrap_or_else(|| id.to_string()),
        config.host.clone(),
        config.port,
    );
    domain.redirect_trailing_slash = config.global.redirect_trailing_slash;
    domain.method_not_allowed = config.global.method_not_allowed;
    domain.auto_options = config.global.auto_options;
    domain.redirect_fixed_path = config.global.redirect_fixed_path;
    domain.cors_enabled = config.cors.enable;
    domain.not_found = config.global.not_found.clone();
    domain.panic = config.global.panic.clone();

    for route in flatten_routes(&config.routes)? {
        domain.add_route(route)?;
    }
    Ok(domain)
}

impl Router {
    /// Build every configured domain.
    ///
    /// # Errors
    ///
    /// [`RouterError::NoDomainsConfigured`] for an empty configuration, or
    /// the first error raised while building a domain.
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouterError> {
        if config.domains.is_empty() {
            return Err(RouterError::NoDomainsConfigured);
        }

        let mut router = Router::new();
        for (id, domain_config) in &config.domains {
            router.add_domain(build_domain(id, domain_config)?)?;
        }
        Ok(router)
    }

    /// Load and build a router from a configuration file.
    ///
    /// # Errors
    ///
    /// Read, parse, and build errors, with the file path as context.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = load_config(path)?;
        let router = Router::from_config(&config)
            .with_context(|| format!("building routes from {}", path.display()))?;

        info!(
            path = %path.display(),
            domains_count = router.len(),
            routes_count = router.domains().iter().map(|d| d.table().len()).sum::<usize>(),
            "Router built"
        );
        Ok(router)
    }
}
