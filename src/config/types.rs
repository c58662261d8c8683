use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Target;

/// Root of a route configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Virtual hosts keyed by an identifier local to the file
    #[serde(default)]
    pub domains: BTreeMap<String, DomainConfig>,
}

/// One virtual host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Display name; the domain identifier is used when absent
    #[serde(default)]
    pub name: Option<String>,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteEntry>,
}

fn default_true() -> bool {
    true
}

/// Domain-wide routing behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_true")]
    pub method_not_allowed: bool,
    #[serde(default = "default_true")]
    pub redirect_trailing_slash: bool,
    #[serde(default = "default_true")]
    pub auto_options: bool,
    #[serde(default)]
    pub redirect_fixed_path: bool,
    #[serde(default)]
    pub not_found: Option<Target>,
    #[serde(default)]
    pub panic: Option<Target>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            method_not_allowed: true,
            redirect_trailing_slash: true,
            auto_options: true,
            redirect_fixed_path: false,
            not_found: None,
            panic: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enable: bool,
}

/// A route as written in configuration, possibly with nested routes
///
/// Nested paths are relative to the parent path and nested routes inherit
/// the parent controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(default)]
    pub path: Option<String>,
    /// Defaults to `GET`
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub controller: Option<String>,
    /// Defaults to the conventional action for the method
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteEntry>,
}
