//! Live reload plugin for development cycles.
//!
//! Exercises every extension surface: a render hook injecting the client
//! script into each rendered page, a named entrypoint for that script, and a
//! contributed route the client polls for the current server revision. The
//! revision changes on process start, so a restarted server tells clients to
//! reload.
//!
//! # Example
//!
//! ```rust
//! use nori::plugins::live_reload::LiveReloadBuilder;
//!
//! let plugin = LiveReloadBuilder::new()
//!     .poll_interval_ms(500)
//!     .build();
//!
//! router.plugin(plugin);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use http::Method;
use serde::Serialize;
use serde_json::json;

use crate::{plugins::Plugin, responder::Json, types::Request};

/// Configuration for the live reload plugin.
#[derive(Clone)]
pub struct Config {
    /// Path of the contributed revision route.
    pub route: String,
    /// Module specifier of the client-side reload script.
    pub specifier: String,
    /// Poll interval handed to the client script, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            route: "/_nori/revision".to_string(),
            specifier: "/_nori/live_reload.js".to_string(),
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Serialize)]
struct Revision {
    revision: u64,
}

/// Builder for the live reload plugin.
pub struct LiveReloadBuilder(Config);

impl LiveReloadBuilder {
    pub fn new() -> Self {
        Self(Config::default())
    }

    pub fn route(mut self, path: impl Into<String>) -> Self {
        self.0.route = path.into();
        self
    }

    pub fn specifier(mut self, specifier: impl Into<String>) -> Self {
        self.0.specifier = specifier.into();
        self
    }

    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.0.poll_interval_ms = interval;
        self
    }

    pub fn build(self) -> Plugin {
        let cfg = self.0;
        let revision = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let state = json!({
            "endpoint": cfg.route.clone(),
            "revision": revision,
            "intervalMs": cfg.poll_interval_ms,
        });

        Plugin::builder("live_reload")
            .entrypoint("live_reload", cfg.specifier)
            .render(move |ctx, next| {
                next.render()?;
                ctx.script("live_reload", state.clone());
                Ok(())
            })
            .route(Method::GET, cfg.route, move |_req: Request| async move {
                Json(Revision { revision })
            })
            .build()
            .expect("live_reload plugin definition is valid")
    }
}

impl Default for LiveReloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}
