//! # Domain Module
//!
//! Virtual-host dispatch on top of the per-method route tables.
//!
//! A [`Router`] holds one [`Domain`] per configured `host[:port]`. Each
//! domain owns its [`RouteTable`] exclusively and carries the flags that
//! decide what a miss turns into: a trailing-slash redirect, a fixed-path
//! redirect, a 405 with an `Allow` list, an automatic `OPTIONS` answer, or
//! a plain not-found. [`Domain::resolve`] applies those rules and returns a
//! [`Resolution`]; writing the response stays with the caller.

mod resolve;
mod router;

pub use resolve::Resolution;
pub use router::Router;

use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::router::{Route, RouteLookup, RouteTable, RouterError};

/// Controller/action pair for the not-found and panic handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub controller: String,
    pub action: String,
}

/// Key a domain is registered under: lower-cased host, plus `:port` unless
/// the port is absent or a scheme default.
#[must_use]
pub fn domain_key(host: &str, port: Option<u16>) -> String {
    let host = host.trim().to_ascii_lowercase();
    match port {
        Some(port) if port != 80 && port != 443 => format!("{host}:{port}"),
        _ => host,
    }
}

/// One virtual host and its routes
#[derive(Debug, Clone)]
pub struct Domain {
    /// Display name from configuration
    pub name: String,
    pub host: String,
    pub port: Option<u16>,
    /// Redirect to the path with the trailing slash toggled when only that
    /// variant is registered
    pub redirect_trailing_slash: bool,
    /// Answer 405 with an `Allow` list when another method matches
    pub method_not_allowed: bool,
    /// Answer unrouted `OPTIONS` requests with an `Allow` list
    pub auto_options: bool,
    /// Redirect to the cleaned, case-corrected path when it matches
    pub redirect_fixed_path: bool,
    /// Resolve CORS preflights through `Access-Control-Request-Method`
    pub cors_enabled: bool,
    pub not_found: Option<Target>,
    pub panic: Option<Target>,
    table: RouteTable,
}

impl Domain {
    /// A domain with no routes and the default flags: trailing-slash
    /// redirects, 405 handling and automatic `OPTIONS` on; fixed-path
    /// redirects and CORS off.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            redirect_trailing_slash: true,
            method_not_allowed: true,
            auto_options: true,
            redirect_fixed_path: false,
            cors_enabled: false,
            not_found: None,
            panic: None,
            table: RouteTable::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        domain_key(&self.host, self.port)
    }

    /// # Errors
    ///
    /// Any registration error from [`RouteTable::add_route`].
    pub fn add_route(&mut self, route: Route) -> Result<(), RouterError> {
        self.table.add_route(route)
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Match `method` + `path` against this domain's routes.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidNodeType`] when a tree is corrupted; it is
    /// logged here before being returned.
    pub fn lookup(&self, method: &Method, path: &str) -> Result<RouteLookup, RouterError> {
        let found = self.table.lookup(method, path).map_err(|err| {
            error!(
                domain = %self.key(),
                method = %method,
                path = %path,
                error = %err,
                "Route lookup failed"
            );
            err
        })?;

        match &found.route {
            Some(route) => debug!(
                domain = %self.key(),
                method = %method,
                path = %path,
                route_name = %route.name,
                route_pattern = %route.path,
                path_params = ?found.params,
                "Route matched"
            ),
            None => debug!(
                domain = %self.key(),
                method = %method,
                path = %path,
                redirect_trailing_slash = found.redirect_trailing_slash,
                "No route matched"
            ),
        }
        Ok(found)
    }

    /// `Allow` header value for `path`, see [`RouteTable::allowed_methods`].
    #[must_use]
    pub fn allowed(&self, method: &Method, path: &str) -> String {
        self.table.allowed_methods(method, path)
    }

    /// # Errors
    ///
    /// See [`RouteTable::reverse_url`].
    pub fn reverse_url(&self, name: &str, args: &[&str]) -> Result<String, RouterError> {
        self.table.reverse_url(name, args)
    }

    /// # Errors
    ///
    /// See [`RouteTable::reverse_url_with`].
    pub fn reverse_url_with(
        &self,
        name: &str,
        args: &[(&str, &str)],
    ) -> Result<String, RouterError> {
        self.table.reverse_url_with(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_key() {
        assert_eq!(domain_key("Example.COM", None), "example.com");
        assert_eq!(domain_key("example.com", Some(80)), "example.com");
        assert_eq!(domain_key("example.com", Some(443)), "example.com");
        assert_eq!(domain_key("localhost", Some(8080)), "localhost:8080");
    }

    #[test]
    fn test_lookup_and_reverse() {
        let mut domain = Domain::new("Shop", "shop.local", None);
        domain
            .add_route(Route::new("product", "GET", "/products/:sku", "Products", "Show"))
            .unwrap();

        let found = domain.lookup(&Method::GET, "/products/A-1").unwrap();
        assert_eq!(found.route.unwrap().name, "product");
        assert_eq!(found.params.get("sku"), Some("A-1"));

        assert_eq!(domain.reverse_url("product", &["B-2"]).unwrap(), "/products/B-2");
        assert_eq!(
            domain
                .reverse_url_with("product", &[("sku", "B-2"), ("ref", "home")])
                .unwrap(),
            "/products/B-2?ref=home"
        );
        assert_eq!(domain.allowed(&Method::POST, "/products/A-1"), "GET, OPTIONS");
    }
}
