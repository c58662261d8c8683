//! # Router Module
//!
//! Path matching and route resolution for radixroute.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing route patterns in one compressed radix tree per HTTP method
//! - Matching request paths and extracting `:param` / `*catchall` values
//! - Reporting trailing-slash and case-fixed redirect candidates
//! - Computing `Allow` header values and reverse-routing URLs by route name
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Build**: routes are inserted through `&mut` methods
//!    ([`RadixTree::insert`], [`RouteTable::add_route`]). Conflicting
//!    patterns are rejected with a [`RouterError`].
//!
//! 2. **Match**: the finished table is shared and queried through `&self`
//!    only. A lookup walks at most one node per path byte and allocates
//!    nothing beyond the returned [`PathParams`].
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use radixroute::router::{Route, RouteTable};
//!
//! let mut table = RouteTable::new();
//! table
//!     .add_route(Route::new("show_user", "GET", "/users/:id", "Users", "Show"))
//!     .unwrap();
//!
//! let found = table.lookup(&Method::GET, "/users/42").unwrap();
//! assert_eq!(found.route.unwrap().action, "Show");
//! assert_eq!(found.params.get("id"), Some("42"));
//! ```

mod error;
mod params;
mod path;
mod radix;
mod table;

pub use error::{ConflictKind, RouterError};
pub use params::{PathParam, PathParams, MAX_INLINE_PARAMS};
pub use path::clean_path;
pub use radix::{Lookup, RadixTree};
pub use table::{Route, RouteLookup, RouteTable};
