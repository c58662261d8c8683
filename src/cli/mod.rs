//! # CLI Module
//!
//! Command-line front-end for inspecting and exercising a route
//! configuration.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load the configuration and report what was built:
//!
//! ```bash
//! radixroute check --config routes.yaml
//! ```
//!
//! ### `routes`
//!
//! Print the route table of every domain, or of one host:
//!
//! ```bash
//! radixroute routes --config routes.yaml --host example.com
//! ```
//!
//! ### `lookup`
//!
//! Resolve one request the way a server would:
//!
//! ```bash
//! radixroute lookup --config routes.yaml --host example.com --method get /users/42
//! radixroute lookup --config routes.yaml --host example.com --method options \
//!     --header "Access-Control-Request-Method: PUT" /users/42
//! ```
//!
//! ### `reverse`
//!
//! Build a URL from a route name. Plain arguments fill parameters in
//! order; `key=value` arguments fill them by name and leftovers become the
//! query string:
//!
//! ```bash
//! radixroute reverse --config routes.yaml --host example.com --name show_user 42
//! radixroute reverse --config routes.yaml --host example.com --name show_user id=42 tab=posts
//! ```
//!
//! ### `watch`
//!
//! Reload on every change to the file until interrupted:
//!
//! ```bash
//! RADIXROUTE_LOG_FORMAT=pretty radixroute watch --config routes.yaml
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
