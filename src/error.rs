//! Error types for plugin configuration and page rendering.
//!
//! `ConfigError` covers everything that must be rejected before the server
//! starts serving: malformed plugin names, duplicate registrations and
//! colliding contributed routes. `RenderError` covers per-request failures
//! inside the render pipeline; the router maps these to a 500 response and
//! logs them, never to a silently empty page.

use std::sync::Arc;

use http::Method;
use thiserror::Error;

/// Startup-time configuration failure. Surfaced before the accept loop runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "invalid plugin name `{name}`: names may only contain lowercase ascii letters and underscores"
    )]
    InvalidPluginName { name: String },

    #[error("plugin `{name}` is registered more than once")]
    DuplicatePlugin { name: String },

    #[error("entrypoint `{entrypoint}` is declared by both `{first}` and `{second}`")]
    DuplicateEntrypoint {
        entrypoint: String,
        first: String,
        second: String,
    },

    #[error("route `{method} {path}` contributed by `{second}` collides with the one from `{first}`")]
    RouteCollision {
        method: Method,
        path: String,
        first: String,
        second: String,
    },
}

/// Per-request rendering failure.
///
/// Cloneable so the pipeline can both hand the error to an outer hook and
/// keep a copy for the dispatcher; an inner failure survives even when a
/// wrapping hook swallows the continuation result.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("plugin `{plugin}` finished its render hook without calling the continuation")]
    ContinuationNotCalled { plugin: String },

    #[error("render hook of plugin `{plugin}` failed: {cause:#}")]
    Hook {
        plugin: String,
        cause: Arc<anyhow::Error>,
    },

    #[error("script from plugin `{plugin}` references unknown entrypoint `{entrypoint}`")]
    UnknownEntrypoint { plugin: String, entrypoint: String },

    #[error("island `{island}` carries props that cannot be serialized: {reason}")]
    IslandProps { island: String, reason: String },

    #[error("state for entrypoint `{entrypoint}` cannot be serialized: {reason}")]
    ScriptState { entrypoint: String, reason: String },
}
