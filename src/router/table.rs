use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::RouterError;
use super::params::PathParams;
use super::radix::RadixTree;

/// A named route as registered with a [`RouteTable`]
///
/// `controller` and `action` are opaque to the router; they are handed back
/// unchanged on a match so the caller can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Unique (per domain) route name used for reverse routing
    pub name: String,
    /// Path pattern, e.g. `/users/:id/posts/*rest`
    pub path: String,
    /// HTTP method, upper-case once registered
    pub method: String,
    pub controller: String,
    pub action: String,
    /// Name of the enclosing route when declared nested in configuration
    pub parent: Option<String>,
}

impl Route {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method: method.into(),
            controller: controller.into(),
            action: action.into(),
            parent: None,
        }
    }

    /// Names of the `:param` / `*catchall` segments in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.path
            .split('/')
            .filter_map(|seg| seg.find([':', '*']).map(|p| &seg[p + 1..]))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}.{} ({})",
            self.method, self.path, self.controller, self.action, self.name
        )
    }
}

/// Outcome of a method + path lookup
#[derive(Debug, Clone, Default)]
pub struct RouteLookup {
    pub route: Option<Arc<Route>>,
    pub params: PathParams,
    /// No match, but the path with a trailing slash added or removed would match
    pub redirect_trailing_slash: bool,
}

impl RouteLookup {
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.route.is_some()
    }
}

/// Per-method radix trees plus the name index used for reverse routing
///
/// Trees are created lazily on the first route for a method, so a method
/// with no routes is answered as not-found without walking anything.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    trees: HashMap<Method, RadixTree<Arc<Route>>>,
    routes: Vec<Arc<Route>>,
    names: HashMap<String, usize>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route in the tree for its method.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or malformed method, a path that does
    /// not start with `/`, a reused route name, or any tree insertion error.
    pub fn add_route(&mut self, mut route: Route) -> Result<(), RouterError> {
        let raw_method = route.method.trim();
        if raw_method.is_empty() {
            return Err(RouterError::EmptyMethod { route: route.name });
        }
        let method = Method::from_bytes(raw_method.to_ascii_uppercase().as_bytes()).map_err(
            |_| RouterError::InvalidMethod {
                route: route.name.clone(),
                method: route.method.clone(),
            },
        )?;

        if !route.path.starts_with('/') {
            return Err(RouterError::InvalidPath {
                route: route.name,
                path: route.path,
            });
        }

        if self.names.contains_key(&route.name) {
            return Err(RouterError::DuplicateRouteName { name: route.name });
        }

        route.method = method.as_str().to_string();
        let route = Arc::new(route);
        self.trees
            .entry(method)
            .or_default()
            .insert(&route.path, Arc::clone(&route))?;

        debug!(
            route_name = %route.name,
            method = %route.method,
            path = %route.path,
            controller = %route.controller,
            action = %route.action,
            "Route registered"
        );

        self.names.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }

    /// Match `path` in the tree registered for `method`.
    ///
    /// # Errors
    ///
    /// Only [`RouterError::InvalidNodeType`], on a corrupted tree.
    pub fn lookup(&self, method: &Method, path: &str) -> Result<RouteLookup, RouterError> {
        let Some(tree) = self.trees.get(method) else {
            return Ok(RouteLookup::default());
        };

        let found = tree.find(path)?;
        Ok(RouteLookup {
            route: found.value.cloned(),
            params: found.params,
            redirect_trailing_slash: found.redirect_trailing_slash,
        })
    }

    /// Value for the `Allow` header: every other method whose tree resolves
    /// `path`, followed by `OPTIONS`. Empty when no other method matches.
    ///
    /// `path == "*"` asks for the server-wide list: every method with at
    /// least one route, independent of `exclude`.
    #[must_use]
    pub fn allowed_methods(&self, exclude: &Method, path: &str) -> String {
        let mut allowed: Vec<&str> = Vec::with_capacity(self.trees.len() + 1);

        for (method, tree) in &self.trees {
            if *method == Method::OPTIONS || tree.is_empty() {
                continue;
            }

            if path == "*" {
                allowed.push(method.as_str());
                continue;
            }

            if method == exclude {
                continue;
            }

            match tree.find(path) {
                Ok(found) if found.is_match() => allowed.push(method.as_str()),
                Ok(_) => {}
                Err(err) => warn!(
                    method = %method,
                    path = %path,
                    error = %err,
                    "Skipping method in Allow computation"
                ),
            }
        }

        if allowed.is_empty() {
            return String::new();
        }

        allowed.sort_unstable();
        allowed.push("OPTIONS");
        allowed.join(", ")
    }

    /// Case-insensitive lookup in the tree for `method`, returning the
    /// registered spelling of the path.
    ///
    /// # Errors
    ///
    /// Only [`RouterError::InvalidNodeType`], on a corrupted tree.
    pub fn find_case_insensitive(
        &self,
        method: &Method,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Result<Option<String>, RouterError> {
        match self.trees.get(method) {
            Some(tree) => tree.find_case_insensitive(path, fix_trailing_slash),
            None => Ok(None),
        }
    }

    /// Build the URL for route `name`, substituting `args` into its
    /// parameters left to right.
    ///
    /// # Errors
    ///
    /// [`RouterError::RouteNotFound`] for an unknown name and
    /// [`RouterError::ArgumentCount`] unless exactly one argument is given
    /// per parameter.
    pub fn reverse_url(&self, name: &str, args: &[&str]) -> Result<String, RouterError> {
        let route = self.route(name).ok_or_else(|| RouterError::RouteNotFound {
            name: name.to_string(),
        })?;

        let expected = route.param_names().count();
        if expected != args.len() {
            return Err(RouterError::ArgumentCount {
                name: name.to_string(),
                expected,
                got: args.len(),
            });
        }

        let mut args = args.iter();
        Ok(substitute(&route.path, |_| args.next().copied()))
    }

    /// Build the URL for route `name` from keyed arguments.
    ///
    /// Every parameter in the pattern takes the first argument with its
    /// name. Arguments not consumed by the pattern are appended as a query
    /// string in the order given.
    ///
    /// # Errors
    ///
    /// [`RouterError::RouteNotFound`] for an unknown name and
    /// [`RouterError::MissingArgument`] when a parameter has no argument.
    pub fn reverse_url_with(
        &self,
        name: &str,
        args: &[(&str, &str)],
    ) -> Result<String, RouterError> {
        let route = self.route(name).ok_or_else(|| RouterError::RouteNotFound {
            name: name.to_string(),
        })?;

        let mut consumed = vec![false; args.len()];
        for param in route.param_names() {
            let Some(pos) = args.iter().position(|(k, _)| *k == param) else {
                return Err(RouterError::MissingArgument {
                    name: name.to_string(),
                    param: param.to_string(),
                });
            };
            consumed[pos] = true;
        }

        let mut url = substitute(&route.path, |param| {
            args.iter().find(|(k, _)| *k == param).map(|(_, v)| *v)
        });

        let query: Vec<String> = args
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|((k, v), _)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }

    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Arc<Route>> {
        self.names.get(name).map(|&i| &self.routes[i])
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    /// Methods with at least one route, sorted by name.
    #[must_use]
    pub fn methods(&self) -> Vec<&Method> {
        let mut methods: Vec<&Method> = self
            .trees
            .iter()
            .filter(|(_, tree)| !tree.is_empty())
            .map(|(m, _)| m)
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Rebuild `pattern` with each wildcard segment replaced by `arg(name)`.
/// Parameter values are percent-encoded; catch-all values keep their `/`.
fn substitute<'a>(pattern: &str, mut arg: impl FnMut(&str) -> Option<&'a str>) -> String {
    let mut url = String::with_capacity(pattern.len() + 16);
    for (i, seg) in pattern.split('/').enumerate() {
        if i > 0 {
            url.push('/');
        }
        let Some(p) = seg.find([':', '*']) else {
            url.push_str(seg);
            continue;
        };
        url.push_str(&seg[..p]);
        let name = &seg[p + 1..];
        if seg.as_bytes()[p] == b':' {
            url.push_str(&urlencoding::encode(arg(name).unwrap_or_default()));
        } else {
            let value = arg(name).unwrap_or_default();
            let value = value.strip_prefix('/').unwrap_or(value);
            let encoded: Vec<_> = value.split('/').map(urlencoding::encode).collect();
            url.push_str(&encoded.join("/"));
        }
    }
    url
}
