//! # radixroute
//!
//! Radix-tree HTTP request routing with per-method route tables and
//! virtual-host dispatch.
//!
//! ## Architecture
//!
//! - **[`router`]** - the compressed prefix tree, per-method route tables,
//!   path parameters, trailing-slash hints, case-insensitive lookup and
//!   reverse routing
//! - **[`domain`]** - virtual hosts keyed by `host[:port]` and the full
//!   request resolution order (redirects, automatic `OPTIONS`, 405)
//! - **[`config`]** - YAML/JSON route configuration with nested routes
//! - **[`hot_reload`]** - lock-free router swaps driven by a file watcher
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `radixroute` command-line front-end
//!
//! ## Quick Start
//!
//! ```
//! use http::{HeaderMap, Method};
//! use radixroute::domain::{Domain, Resolution, Router};
//! use radixroute::router::Route;
//!
//! let mut domain = Domain::new("main", "example.com", None);
//! domain
//!     .add_route(Route::new("show_user", "GET", "/users/:id", "Users", "Show"))
//!     .unwrap();
//!
//! let mut router = Router::new();
//! router.add_domain(domain).unwrap();
//!
//! let domain = router.lookup("Example.com:80").unwrap();
//! match domain.resolve(&Method::GET, "/users/42", &HeaderMap::new()).unwrap() {
//!     Resolution::Found { route, params, .. } => {
//!         assert_eq!(route.action, "Show");
//!         assert_eq!(params.get("id"), Some("42"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod hot_reload;
pub mod logging;
pub mod router;

pub use domain::{Domain, Resolution, Router};
pub use router::{PathParams, RadixTree, Route, RouteTable, RouterError};
