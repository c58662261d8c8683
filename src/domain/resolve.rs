use http::header::ACCESS_CONTROL_REQUEST_METHOD;
use http::{HeaderMap, Method};
use std::sync::Arc;
use tracing::debug;

use super::Domain;
use crate::router::{clean_path, PathParams, Route, RouterError};

const METHOD_OVERRIDE: &str = "x-http-method-override";

/// What the caller should do with a request
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Dispatch to `route`. `method` is the method the route was found
    /// under, which differs from the request method for overrides and
    /// CORS preflights.
    Found {
        method: Method,
        route: Arc<Route>,
        params: PathParams,
    },
    /// Redirect to the same path with the trailing slash toggled
    RedirectTrailingSlash(String),
    /// Redirect to the cleaned, case-corrected path
    RedirectFixedPath(String),
    /// 405 with the given `Allow` header
    MethodNotAllowed { allow: String },
    /// Answer `OPTIONS` with the given `Allow` header
    AutoOptions { allow: String },
    NotFound,
}

impl Resolution {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }
}

fn header_method(headers: &HeaderMap, name: impl http::header::AsHeaderName) -> Option<Method> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Method::from_bytes(value.to_ascii_uppercase().as_bytes()).ok()
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) if path.len() > 1 => stripped.to_string(),
        _ => format!("{path}/"),
    }
}

impl Domain {
    /// Resolve a request against this domain.
    ///
    /// - `POST` with `X-HTTP-Method-Override` is looked up under the
    ///   override method.
    /// - `OPTIONS` with CORS enabled and an `Access-Control-Request-Method`
    ///   header falls back to the requested method when no `OPTIONS` route
    ///   matches.
    /// - On a miss, redirects come first (only for methods other than
    ///   `CONNECT` and paths other than `/`), then automatic `OPTIONS`, then
    ///   405.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidNodeType`] when a tree is corrupted.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Resolution, RouterError> {
        let mut method = method.clone();
        if method == Method::POST {
            if let Some(over) = header_method(headers, METHOD_OVERRIDE) {
                debug!(
                    domain = %self.key(),
                    path = %path,
                    override_method = %over,
                    "Applying method override"
                );
                method = over;
            }
        }

        let mut found = self.lookup(&method, path)?;
        let mut found_method = method.clone();

        if !found.is_found() && method == Method::OPTIONS && self.cors_enabled {
            if let Some(requested) = header_method(headers, ACCESS_CONTROL_REQUEST_METHOD) {
                debug!(
                    domain = %self.key(),
                    path = %path,
                    requested_method = %requested,
                    "Resolving CORS preflight"
                );
                let preflight = self.lookup(&requested, path)?;
                if preflight.is_found() {
                    found = preflight;
                    found_method = requested;
                }
            }
        }

        if let Some(route) = found.route {
            return Ok(Resolution::Found {
                method: found_method,
                route,
                params: found.params,
            });
        }

        if method != Method::CONNECT && path != "/" {
            if found.redirect_trailing_slash && self.redirect_trailing_slash {
                return Ok(Resolution::RedirectTrailingSlash(toggle_trailing_slash(path)));
            }

            if self.redirect_fixed_path {
                let fixed = self.table().find_case_insensitive(
                    &method,
                    &clean_path(path),
                    self.redirect_trailing_slash,
                )?;
                if let Some(fixed) = fixed {
                    return Ok(Resolution::RedirectFixedPath(fixed));
                }
            }
        }

        if method == Method::OPTIONS {
            if self.auto_options {
                let allow = self.allowed(&method, path);
                if !allow.is_empty() {
                    return Ok(Resolution::AutoOptions { allow });
                }
            }
        } else if self.method_not_allowed {
            let allow = self.allowed(&method, path);
            if !allow.is_empty() {
                return Ok(Resolution::MethodNotAllowed { allow });
            }
        }

        Ok(Resolution::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn domain() -> Domain {
        let mut domain = Domain::new("Api", "api.local", None);
        for (name, method, path) in [
            ("widgets", "GET", "/widgets"),
            ("create_widget", "POST", "/widgets"),
            ("widget", "GET", "/widgets/:id"),
            ("update_widget", "PUT", "/widgets/:id"),
            ("docs", "GET", "/docs/"),
            ("profile", "GET", "/UserProfile"),
        ] {
            domain
                .add_route(Route::new(name, method, path, "Widgets", "Index"))
                .unwrap();
        }
        domain
    }

    fn no_headers() -> HeaderMap {
        HeaderMap::new()
    }

    #[test]
    fn test_found() {
        let res = domain()
            .resolve(&Method::GET, "/widgets/7", &no_headers())
            .unwrap();
        match res {
            Resolution::Found {
                method,
                route,
                params,
            } => {
                assert_eq!(method, Method::GET);
                assert_eq!(route.name, "widget");
                assert_eq!(params.get("id"), Some("7"));
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    #[test]
    fn test_trailing_slash_redirect() {
        let d = domain();
        assert!(matches!(
            d.resolve(&Method::GET, "/docs", &no_headers()).unwrap(),
            Resolution::RedirectTrailingSlash(p) if p == "/docs/"
        ));
        assert!(matches!(
            d.resolve(&Method::GET, "/widgets/", &no_headers()).unwrap(),
            Resolution::RedirectTrailingSlash(p) if p == "/widgets"
        ));

        let mut d = domain();
        d.redirect_trailing_slash = false;
        d.method_not_allowed = false;
        assert!(matches!(
            d.resolve(&Method::GET, "/docs", &no_headers()).unwrap(),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_fixed_path_redirect() {
        let mut d = domain();
        assert!(matches!(
            d.resolve(&Method::GET, "/userprofile", &no_headers()).unwrap(),
            Resolution::NotFound
        ));

        d.redirect_fixed_path = true;
        assert!(matches!(
            d.resolve(&Method::GET, "/userprofile", &no_headers()).unwrap(),
            Resolution::RedirectFixedPath(p) if p == "/UserProfile"
        ));
        assert!(matches!(
            d.resolve(&Method::GET, "/a/../WIDGETS//7", &no_headers()).unwrap(),
            Resolution::RedirectFixedPath(p) if p == "/widgets/7"
        ));
    }

    #[test]
    fn test_no_redirect_to_unregistered_path() {
        let mut d = Domain::new("Api", "api.local", None);
        for (name, path) in [("cd", "/ab/cd"), ("abx", "/abx")] {
            d.add_route(Route::new(name, "GET", path, "Pages", "Show"))
                .unwrap();
        }
        d.redirect_fixed_path = true;

        for path in ["/ab/", "/ab", "/AB/"] {
            assert!(
                matches!(
                    d.resolve(&Method::GET, path, &no_headers()).unwrap(),
                    Resolution::NotFound
                ),
                "{path}"
            );
        }
    }

    #[test]
    fn test_method_not_allowed() {
        let d = domain();
        match d.resolve(&Method::DELETE, "/widgets", &no_headers()).unwrap() {
            Resolution::MethodNotAllowed { allow } => assert_eq!(allow, "GET, POST, OPTIONS"),
            other => panic!("unexpected resolution {other:?}"),
        }

        let mut d = domain();
        d.method_not_allowed = false;
        assert!(matches!(
            d.resolve(&Method::DELETE, "/widgets", &no_headers()).unwrap(),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_auto_options() {
        let d = domain();
        match d.resolve(&Method::OPTIONS, "/widgets/1", &no_headers()).unwrap() {
            Resolution::AutoOptions { allow } => assert_eq!(allow, "GET, PUT, OPTIONS"),
            other => panic!("unexpected resolution {other:?}"),
        }
        assert!(matches!(
            d.resolve(&Method::OPTIONS, "/missing", &no_headers()).unwrap(),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_cors_preflight_uses_requested_method() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("PUT"));

        let mut d = domain();
        d.cors_enabled = true;
        match d.resolve(&Method::OPTIONS, "/widgets/1", &headers).unwrap() {
            Resolution::Found { method, route, .. } => {
                assert_eq!(method, Method::PUT);
                assert_eq!(route.name, "update_widget");
            }
            other => panic!("unexpected resolution {other:?}"),
        }

        // without CORS the preflight header is ignored
        d.cors_enabled = false;
        assert!(matches!(
            d.resolve(&Method::OPTIONS, "/widgets/1", &headers).unwrap(),
            Resolution::AutoOptions { .. }
        ));
    }

    #[test]
    fn test_method_override_on_post() {
        let mut headers = HeaderMap::new();
        headers.insert(METHOD_OVERRIDE, HeaderValue::from_static("put"));

        let d = domain();
        match d.resolve(&Method::POST, "/widgets/9", &headers).unwrap() {
            Resolution::Found { method, route, .. } => {
                assert_eq!(method, Method::PUT);
                assert_eq!(route.name, "update_widget");
            }
            other => panic!("unexpected resolution {other:?}"),
        }

        // only POST can be overridden
        assert!(matches!(
            d.resolve(&Method::GET, "/widgets/9", &headers).unwrap(),
            Resolution::Found { route, .. } if route.name == "widget"
        ));
    }
}
