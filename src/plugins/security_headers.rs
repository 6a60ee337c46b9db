//! Security headers plugin.
//!
//! Stamps standard browser security headers on every response that does not
//! already carry them, so handlers keep the last word.
//!
//! # Example
//!
//! ```rust
//! use nori::plugins::security_headers::SecurityHeadersBuilder;
//!
//! let plugin = SecurityHeadersBuilder::new()
//!     .frame_options("SAMEORIGIN")
//!     .content_security_policy("default-src 'self'")
//!     .build();
//!
//! router.plugin(plugin);
//! ```

use http::{
    HeaderValue,
    header::{
        CONTENT_SECURITY_POLICY, HeaderName, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
        X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
    },
};

use crate::{
    middleware::Next,
    plugins::Plugin,
    types::{Request, Response},
};

/// Configuration for the security headers plugin.
#[derive(Clone)]
pub struct Config {
    pub frame_options: Option<String>,
    pub nosniff: bool,
    pub referrer_policy: Option<String>,
    pub strict_transport_security: Option<String>,
    pub content_security_policy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_options: Some("DENY".to_string()),
            nosniff: true,
            referrer_policy: Some("same-origin".to_string()),
            strict_transport_security: None,
            content_security_policy: None,
        }
    }
}

/// Builder for the security headers plugin.
pub struct SecurityHeadersBuilder(Config);

impl SecurityHeadersBuilder {
    pub fn new() -> Self {
        Self(Config::default())
    }

    pub fn frame_options(mut self, value: impl Into<String>) -> Self {
        self.0.frame_options = Some(value.into());
        self
    }

    pub fn no_frame_options(mut self) -> Self {
        self.0.frame_options = None;
        self
    }

    pub fn nosniff(mut self, enabled: bool) -> Self {
        self.0.nosniff = enabled;
        self
    }

    pub fn referrer_policy(mut self, value: impl Into<String>) -> Self {
        self.0.referrer_policy = Some(value.into());
        self
    }

    pub fn strict_transport_security(mut self, value: impl Into<String>) -> Self {
        self.0.strict_transport_security = Some(value.into());
        self
    }

    pub fn content_security_policy(mut self, value: impl Into<String>) -> Self {
        self.0.content_security_policy = Some(value.into());
        self
    }

    pub fn build(self) -> Plugin {
        let cfg = self.0;
        Plugin::builder("security_headers")
            .middleware(move |req, next| {
                let cfg = cfg.clone();
                async move { apply_headers(req, next, cfg).await }
            })
            .build()
            .expect("security_headers plugin definition is valid")
    }
}

impl Default for SecurityHeadersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn apply_headers(req: Request, next: Next, cfg: Config) -> Response {
    let mut res = next.run(req).await;

    if let Some(value) = &cfg.frame_options {
        set_if_absent(&mut res, X_FRAME_OPTIONS, value);
    }
    if cfg.nosniff {
        set_if_absent(&mut res, X_CONTENT_TYPE_OPTIONS, "nosniff");
    }
    if let Some(value) = &cfg.referrer_policy {
        set_if_absent(&mut res, REFERRER_POLICY, value);
    }
    if let Some(value) = &cfg.strict_transport_security {
        set_if_absent(&mut res, STRICT_TRANSPORT_SECURITY, value);
    }
    if let Some(value) = &cfg.content_security_policy {
        set_if_absent(&mut res, CONTENT_SECURITY_POLICY, value);
    }

    res
}

fn set_if_absent(res: &mut Response, name: HeaderName, value: &str) {
    if res.headers().contains_key(&name) {
        return;
    }
    match HeaderValue::from_str(value) {
        Ok(value) => {
            res.headers_mut().insert(name, value);
        }
        Err(err) => {
            tracing::warn!(header = %name, error = %err, "invalid security header value");
        }
    }
}
