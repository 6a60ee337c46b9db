//! Request router and startup composition of plugin contributions.
//!
//! The router is assembled by the host application: routes, pages,
//! middleware and plugins. The first dispatch (or an explicit
//! [`Router::compose`] call, which `serve` performs before accepting
//! connections) merges plugin-contributed routes and middleware into the
//! host tables and builds the render pipeline. Composition fails fast on
//! duplicate plugin names, duplicate entrypoints and route collisions.

use std::{collections::HashMap, sync::Arc};

use http::{Method, StatusCode};
use once_cell::sync::OnceCell;

use crate::{
    body::NoriBody,
    error::ConfigError,
    handler::{BoxHandler, Handler},
    markup::Component,
    middleware::{self, Next},
    plugins::{Plugin, PluginRegistry, RouteKind},
    render::RenderPipeline,
    responder::{Html, Responder},
    route::{PathParams, Route},
    types::{BoxMiddleware, Request, Response},
};

pub struct Router {
    routes: Vec<(Method, String, BoxHandler)>,
    pages: Vec<(String, Arc<dyn Component>)>,
    middlewares: Vec<BoxMiddleware>,
    plugins: Vec<Plugin>,
    composed: OnceCell<Composed>,
}

struct Composed {
    routes: Vec<Arc<Route>>,
    chain: Arc<[BoxMiddleware]>,
    pipeline: Arc<RenderPipeline>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            pages: Vec::new(),
            middlewares: Vec::new(),
            plugins: Vec::new(),
            composed: OnceCell::new(),
        }
    }

    /// Registers a host route.
    pub fn route<H>(&mut self, method: Method, path: &str, handler: H) -> &mut Self
    where
        H: Handler,
    {
        self.routes
            .push((method, path.to_owned(), BoxHandler::new(handler)));
        self
    }

    /// Registers a host page, served on GET and rendered through the full
    /// plugin hook pipeline.
    pub fn page<C>(&mut self, path: &str, component: C) -> &mut Self
    where
        C: Component + 'static,
    {
        self.pages.push((path.to_owned(), Arc::new(component)));
        self
    }

    /// Appends a host middleware. Host middleware runs before any
    /// plugin-contributed middleware.
    pub fn middleware<F, Fut, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Responder + Send + 'static,
    {
        self.middlewares.push(middleware::into_middleware(f));
        self
    }

    /// Registers a plugin. Contributions are merged at composition time in
    /// registration order.
    pub fn plugin(&mut self, plugin: Plugin) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Merges plugin contributions and builds the render pipeline.
    ///
    /// Idempotent; `serve` calls this before accepting connections so
    /// configuration errors surface at startup rather than on the first
    /// request.
    pub fn compose(&self) -> Result<(), ConfigError> {
        self.composed
            .get_or_try_init(|| self.compose_inner())
            .map(|_| ())
    }

    fn compose_inner(&self) -> Result<Composed, ConfigError> {
        let mut registry = PluginRegistry::new();
        for plugin in &self.plugins {
            registry.register(plugin.clone())?;
        }

        let pipeline = Arc::new(RenderPipeline::from_registry(&registry)?);

        let mut claimed: HashMap<(Method, String), String> = HashMap::new();
        let mut routes = Vec::new();

        for (method, path, handler) in &self.routes {
            claim(&mut claimed, method, path, "host")?;
            routes.push(Arc::new(Route::new(
                path.clone(),
                method.clone(),
                handler.clone(),
            )));
        }

        for (path, component) in &self.pages {
            claim(&mut claimed, &Method::GET, path, "host")?;
            routes.push(Arc::new(Route::new(
                path.clone(),
                Method::GET,
                page_handler(pipeline.clone(), component.clone()),
            )));
        }

        for plugin in registry.iter() {
            for contributed in plugin.routes() {
                claim(
                    &mut claimed,
                    &contributed.method,
                    &contributed.path,
                    plugin.name(),
                )?;
                let handler = match &contributed.kind {
                    RouteKind::Handler(handler) => handler.clone(),
                    RouteKind::Component(component) => {
                        page_handler(pipeline.clone(), component.clone())
                    }
                };
                routes.push(Arc::new(Route::new(
                    contributed.path.clone(),
                    contributed.method.clone(),
                    handler,
                )));
            }
        }

        let mut chain = self.middlewares.clone();
        for plugin in registry.iter() {
            chain.extend(plugin.middlewares().iter().cloned());
        }

        tracing::debug!(
            plugins = registry.len(),
            routes = routes.len(),
            middlewares = chain.len(),
            "router composed"
        );

        Ok(Composed {
            routes,
            chain: chain.into(),
            pipeline,
        })
    }

    pub async fn dispatch(&self, mut req: Request) -> Response {
        let composed = match self.composed.get_or_try_init(|| self.compose_inner()) {
            Ok(composed) => composed,
            Err(err) => {
                tracing::error!(error = %err, "router composition failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invalid server configuration",
                )
                    .into_response();
            }
        };

        let path = req.uri().path().to_owned();

        for route in &composed.routes {
            if route.method != *req.method() {
                continue;
            }

            if let Some(params) = route.match_path(&path) {
                req.extensions_mut().insert(PathParams(params));

                let next = Next {
                    idx: 0,
                    chain: composed.chain.clone(),
                    endpoint: route.handler.clone(),
                };
                return next.run(req).await;
            }
        }

        hyper::Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(NoriBody::empty())
            .unwrap()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn claim(
    claimed: &mut HashMap<(Method, String), String>,
    method: &Method,
    path: &str,
    source: &str,
) -> Result<(), ConfigError> {
    if let Some(first) = claimed.insert((method.clone(), path.to_owned()), source.to_owned()) {
        return Err(ConfigError::RouteCollision {
            method: method.clone(),
            path: path.to_owned(),
            first,
            second: source.to_owned(),
        });
    }
    Ok(())
}

fn page_handler(pipeline: Arc<RenderPipeline>, component: Arc<dyn Component>) -> BoxHandler {
    BoxHandler::new(move |_req: Request| {
        let pipeline = pipeline.clone();
        let component = component.clone();
        async move {
            match pipeline.render_page(component).await {
                Ok(output) => Html(output.html).into_response(),
                Err(err) => {
                    tracing::error!(error = %err, "page render failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "page render failed").into_response()
                }
            }
        }
    })
}
