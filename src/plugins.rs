//! Plugin records, validated construction and the startup registry.
//!
//! A [`Plugin`] bundles everything a third party may contribute to the
//! framework: render hooks that wrap page generation, client entrypoints,
//! routes and middleware. Records are produced by [`Plugin::builder`], which
//! validates the plugin name at construction time; malformed plugins cannot
//! exist. The [`PluginRegistry`] collects records in registration order at
//! startup and rejects duplicate names before the server begins serving.
//!
//! # Examples
//!
//! ```rust
//! use nori::plugins::Plugin;
//! use nori::render::Style;
//!
//! let plugin = Plugin::builder("branding")
//!     .render(|ctx, next| {
//!         next.render()?;
//!         ctx.style(Style::new("header { background: teal; }"));
//!         Ok(())
//!     })
//!     .build()?;
//!
//! assert_eq!(plugin.name(), "branding");
//! # anyhow::Ok(())
//! ```

use std::sync::Arc;

use http::Method;

use crate::{
    error::ConfigError,
    handler::{BoxHandler, Handler},
    markup::Component,
    middleware::{self, Next},
    render::{AsyncRenderNext, BoxAsyncRenderHook, BoxRenderHook, HookContext, RenderNext},
    responder::Responder,
    types::{BoxMiddleware, Request},
};

/// Development-cycle plugin: revision route, client entrypoint and reload script.
pub mod live_reload;

/// Middleware plugin stamping standard security headers on responses.
pub mod security_headers;

/// A validated, immutable plugin record.
///
/// Created through [`Plugin::builder`]; lives for the process lifetime once
/// registered. Cloning is cheap, all hooks and handlers are
/// reference-counted.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    render: Option<BoxRenderHook>,
    render_async: Option<BoxAsyncRenderHook>,
    entrypoints: Vec<(String, String)>,
    routes: Vec<PluginRoute>,
    middlewares: Vec<BoxMiddleware>,
}

impl Plugin {
    /// Starts building a plugin with the given name.
    ///
    /// The name must be non-empty and consist of lowercase ascii letters and
    /// underscores only; [`PluginBuilder::build`] rejects anything else.
    pub fn builder(name: impl Into<String>) -> PluginBuilder {
        PluginBuilder {
            name: name.into(),
            render: None,
            render_async: None,
            entrypoints: Vec::new(),
            routes: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    /// Unique name identifying this plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn render_hook(&self) -> Option<&BoxRenderHook> {
        self.render.as_ref()
    }

    pub(crate) fn render_async_hook(&self) -> Option<&BoxAsyncRenderHook> {
        self.render_async.as_ref()
    }

    pub(crate) fn entrypoints(&self) -> &[(String, String)] {
        &self.entrypoints
    }

    pub(crate) fn routes(&self) -> &[PluginRoute] {
        &self.routes
    }

    pub(crate) fn middlewares(&self) -> &[BoxMiddleware] {
        &self.middlewares
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("render", &self.render.is_some())
            .field("render_async", &self.render_async.is_some())
            .field("entrypoints", &self.entrypoints)
            .field("routes", &self.routes.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// A route contributed by a plugin, merged into the host routing table at
/// startup.
#[derive(Clone)]
pub struct PluginRoute {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) kind: RouteKind,
}

#[derive(Clone)]
pub(crate) enum RouteKind {
    Handler(BoxHandler),
    Component(Arc<dyn Component>),
}

/// Fluent constructor for [`Plugin`] records.
pub struct PluginBuilder {
    name: String,
    render: Option<BoxRenderHook>,
    render_async: Option<BoxAsyncRenderHook>,
    entrypoints: Vec<(String, String)>,
    routes: Vec<PluginRoute>,
    middlewares: Vec<BoxMiddleware>,
}

impl PluginBuilder {
    /// Installs the synchronous render hook.
    ///
    /// The hook runs inside the non-preemptible sync round of each request
    /// and must call `next.render()` exactly once.
    pub fn render<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HookContext, RenderNext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(hook));
        self
    }

    /// Installs the asynchronous render hook.
    ///
    /// Async hooks wrap the entire sync round and may await; they must call
    /// `next.render().await` exactly once. State shared across await points
    /// has to stay request-scoped, concurrent requests interleave here.
    pub fn render_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(HookContext, AsyncRenderNext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let boxed: BoxAsyncRenderHook = Arc::new(move |ctx, next| Box::pin(hook(ctx, next)));
        self.render_async = Some(boxed);
        self
    }

    /// Declares a named client entrypoint module.
    ///
    /// Render hooks reference the name in [`HookContext::script`]; the
    /// specifier is the module URL the client loads.
    pub fn entrypoint(mut self, name: impl Into<String>, specifier: impl Into<String>) -> Self {
        self.entrypoints.push((name.into(), specifier.into()));
        self
    }

    /// Contributes a handler route, dispatched exactly like a host route.
    pub fn route<H>(mut self, method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler,
    {
        self.routes.push(PluginRoute {
            method,
            path: path.into(),
            kind: RouteKind::Handler(BoxHandler::new(handler)),
        });
        self
    }

    /// Contributes a page route rendered through the full hook pipeline.
    pub fn component_route<C>(mut self, path: impl Into<String>, component: C) -> Self
    where
        C: Component + 'static,
    {
        self.routes.push(PluginRoute {
            method: Method::GET,
            path: path.into(),
            kind: RouteKind::Component(Arc::new(component)),
        });
        self
    }

    /// Contributes a middleware, appended after the host chain in plugin
    /// registration order.
    pub fn middleware<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Responder + Send + 'static,
    {
        self.middlewares.push(middleware::into_middleware(f));
        self
    }

    /// Validates the record and produces the immutable [`Plugin`].
    pub fn build(self) -> Result<Plugin, ConfigError> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_')
        {
            return Err(ConfigError::InvalidPluginName { name: self.name });
        }

        Ok(Plugin {
            name: self.name,
            render: self.render,
            render_async: self.render_async,
            entrypoints: self.entrypoints,
            routes: self.routes,
            middlewares: self.middlewares,
        })
    }
}

/// Ordered collection of plugins, built once at startup.
///
/// Registration order is the order hooks nest, contributions merge and
/// middleware composes. Read-only after the server starts.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin, rejecting duplicate names.
    pub fn register(&mut self, plugin: Plugin) -> Result<(), ConfigError> {
        if self.plugins.iter().any(|p| p.name == plugin.name) {
            return Err(ConfigError::DuplicatePlugin { name: plugin.name });
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Plugins in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Plugin> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names_accepted() {
        for name in ["live_reload", "a", "_", "dark_mode"] {
            assert!(Plugin::builder(name).build().is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_names_rejected() {
        for name in ["", "Caps", "digit1", "with-dash", "with space", "ütf"] {
            let err = Plugin::builder(name).build().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPluginName { name: ref n } if n == name),
                "{name}"
            );
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin::builder("dup").build().unwrap())
            .unwrap();
        let err = registry
            .register(Plugin::builder("dup").build().unwrap())
            .unwrap_err();

        assert!(matches!(err, ConfigError::DuplicatePlugin { ref name } if name == "dup"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = PluginRegistry::new();
        for name in ["one", "two", "three"] {
            registry
                .register(Plugin::builder(name).build().unwrap())
                .unwrap();
        }

        let names: Vec<_> = registry.iter().map(|p| p.name().to_owned()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }
}
