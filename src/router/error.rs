use std::fmt;

/// Why a wildcard could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// `:` or `*` without a name, e.g. `/users/:/posts`
    UnnamedWildcard,
    /// A second `:`/`*` inside the same segment, e.g. `/:a:b`
    MultipleWildcards,
    /// The wildcard would make existing static children unreachable
    StaticChildren,
    /// A different wildcard already occupies this position
    WildcardMismatch {
        /// Path segment of the new route that collided
        segment: String,
        /// Wildcard already registered at the position
        existing: String,
    },
    /// `*name` followed by more path
    CatchAllNotAtEnd,
    /// Catch-all collides with a value registered at the segment root
    CatchAllRoot,
    /// Catch-all not preceded by `/`
    MissingSlash,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::UnnamedWildcard => {
                write!(f, "wildcards must be named with a non-empty name")
            }
            ConflictKind::MultipleWildcards => {
                write!(f, "only one wildcard per path segment is allowed")
            }
            ConflictKind::StaticChildren => {
                write!(f, "wildcard conflicts with existing children")
            }
            ConflictKind::WildcardMismatch { segment, existing } => write!(
                f,
                "'{}' conflicts with existing wildcard '{}'",
                segment, existing
            ),
            ConflictKind::CatchAllNotAtEnd => {
                write!(f, "catch-all routes are only allowed at the end of the path")
            }
            ConflictKind::CatchAllRoot => write!(
                f,
                "catch-all conflicts with existing value for the path segment root"
            ),
            ConflictKind::MissingSlash => write!(f, "no / before catch-all"),
        }
    }
}

/// Errors produced while building or querying the routing tables.
///
/// Registration errors abort the load that produced them; the previously
/// active router (if any) keeps serving. `InvalidNodeType` is the only
/// variant a lookup can return and means the tree itself is corrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The path pattern cannot be inserted at its wildcard position
    Conflict {
        /// Full pattern being inserted
        path: String,
        /// What collided
        kind: ConflictKind,
    },
    /// A value is already registered for exactly this pattern
    DuplicateRoute {
        /// Pattern that was registered twice
        path: String,
    },
    /// Route name already used in the same domain
    DuplicateRouteName {
        /// Name that was registered twice
        name: String,
    },
    /// Route registered without an HTTP method
    EmptyMethod {
        /// Name of the offending route
        route: String,
    },
    /// Method string is not a valid HTTP token
    InvalidMethod {
        /// Name of the offending route
        route: String,
        /// Method as configured
        method: String,
    },
    /// Route pattern does not begin with `/`
    InvalidPath {
        /// Name of the offending route
        route: String,
        /// Pattern as configured
        path: String,
    },
    /// A wildcard child carries a static/root node type
    InvalidNodeType,
    /// Reverse routing: no route registered under this name
    RouteNotFound {
        /// Requested route name
        name: String,
    },
    /// Reverse routing: positional argument count mismatch
    ArgumentCount {
        /// Route name
        name: String,
        /// Parameters in the pattern
        expected: usize,
        /// Arguments supplied
        got: usize,
    },
    /// Reverse routing: a pattern parameter has no keyed argument
    MissingArgument {
        /// Route name
        name: String,
        /// Parameter name without a value
        param: String,
    },
    /// Configuration did not declare any domain
    NoDomainsConfigured,
    /// Two domains resolve to the same `host[:port]` key
    DuplicateDomain {
        /// Lower-cased `host[:port]`
        key: String,
    },
    /// A configured route is incomplete
    InvalidRouteConfig {
        /// Route name
        route: String,
        /// What is missing or malformed
        reason: String,
    },
}

impl RouterError {
    /// True for every wildcard placement failure.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, RouterError::Conflict { .. })
    }

    pub(crate) fn conflict(path: &str, kind: ConflictKind) -> Self {
        RouterError::Conflict {
            path: path.to_string(),
            kind,
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Conflict { path, kind } => {
                write!(f, "{} in path '{}'", kind, path)
            }
            RouterError::DuplicateRoute { path } => {
                write!(f, "value already registered for path '{}'", path)
            }
            RouterError::DuplicateRouteName { name } => {
                write!(f, "route name '{}' is already registered", name)
            }
            RouterError::EmptyMethod { route } => {
                write!(f, "route '{}' has an empty method", route)
            }
            RouterError::InvalidMethod { route, method } => {
                write!(f, "route '{}' has an invalid method '{}'", route, method)
            }
            RouterError::InvalidPath { route, path } => write!(
                f,
                "route '{}' path '{}' must begin with '/'",
                route, path
            ),
            RouterError::InvalidNodeType => write!(f, "invalid node type in routing tree"),
            RouterError::RouteNotFound { name } => {
                write!(f, "route name '{}' not found", name)
            }
            RouterError::ArgumentCount {
                name,
                expected,
                got,
            } => write!(
                f,
                "route '{}' expects {} path arguments, got {}",
                name, expected, got
            ),
            RouterError::MissingArgument { name, param } => write!(
                f,
                "route '{}' path parameter '{}' has no argument",
                name, param
            ),
            RouterError::NoDomainsConfigured => write!(f, "no domains found in route configuration"),
            RouterError::DuplicateDomain { key } => {
                write!(f, "domain '{}' is configured more than once", key)
            }
            RouterError::InvalidRouteConfig { route, reason } => {
                write!(f, "route '{}': {}", route, reason)
            }
        }
    }
}

impl std::error::Error for RouterError {}
