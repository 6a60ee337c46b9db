//! Route definition and path matching.
//!
//! A `Route` binds a path pattern to an HTTP method and a handler. Patterns
//! support dynamic segments in curly braces (`/users/{id}`) which are
//! captured as named parameters and made available to handlers through the
//! request extensions as [`PathParams`].
//!
//! # Examples
//!
//! ```rust
//! use nori::route::Route;
//! use nori::handler::BoxHandler;
//! use nori::types::Request;
//! use http::Method;
//!
//! async fn handler(_req: Request) -> &'static str {
//!     "Hello, World!"
//! }
//!
//! let route = Route::new("/users/{id}".to_string(), Method::GET, BoxHandler::new(handler));
//! let params = route.match_path("/users/123").unwrap();
//! assert_eq!(params.get("id"), Some(&"123".to_string()));
//! ```

use std::collections::HashMap;

use http::Method;
use regex::Regex;

use crate::handler::BoxHandler;

/// Path parameters captured from dynamic route segments, stored in the
/// request extensions by the router before the middleware chain runs.
#[derive(Clone, Debug)]
pub struct PathParams(pub HashMap<String, String>);

/// A single HTTP endpoint: path pattern, method and handler.
pub struct Route {
    /// Original path string used to create this route.
    pub path: String,
    /// Compiled regular expression for path matching.
    pub regex: Regex,
    /// Names of parameters extracted from dynamic path segments.
    pub param_names: Vec<String>,
    /// HTTP method this route responds to.
    pub method: Method,
    /// Handler executed when the route is matched.
    pub handler: BoxHandler,
}

impl Route {
    /// Creates a new route from a path pattern, method and handler.
    pub fn new(path: String, method: Method, handler: BoxHandler) -> Self {
        let (regex, param_names) = Self::parse_pattern(&path);

        Self {
            path,
            regex,
            param_names,
            method,
            handler,
        }
    }

    /// Matches `path` against this route's pattern, returning captured
    /// parameters on success.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        self.regex.captures(path).map(|caps| {
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect::<_>()
        })
    }

    /// Converts a pattern with `{param}` segments into a regex and the list
    /// of parameter names, in order of appearance.
    fn parse_pattern(pattern: &str) -> (Regex, Vec<String>) {
        let mut regex_str = String::from("^");
        let mut param_names = Vec::new();

        for s in pattern.trim_matches('/').split('/') {
            regex_str.push('/');

            if s.starts_with('{') && s.ends_with('}') {
                let param = &s[1..s.len() - 1];
                regex_str.push_str("([^/]+)");
                param_names.push(param.to_string());
            } else {
                regex_str.push_str(&regex::escape(s));
            }
        }

        regex_str.push('$');
        let regex = Regex::new(&regex_str).expect("Invalid route pattern");
        (regex, param_names)
    }
}
