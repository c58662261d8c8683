//! # Route Configuration
//!
//! Serde model of the route configuration file and the code that turns it
//! into a [`crate::domain::Router`].
//!
//! ```yaml
//! domains:
//!   localhost:
//!     host: localhost
//!     port: 8080
//!     global:
//!       redirect_fixed_path: true
//!     cors:
//!       enable: true
//!     routes:
//!       users:
//!         path: /users
//!         controller: Users
//!         action: List
//!         routes:
//!           show_user:
//!             path: /:id        # GET /users/:id -> Users.Index
//! ```
//!
//! Files ending in `.yaml` / `.yml` are read as YAML, anything else as JSON.

mod build;
mod load;
mod types;

pub use build::{build_domain, default_action, flatten_routes};
pub use load::{load_config, parse_config};
pub use types::{CorsConfig, DomainConfig, GlobalConfig, RouteConfig, RouteEntry};
