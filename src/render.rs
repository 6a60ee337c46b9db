//! Render pipeline: hook nesting, contribution collection and page assembly.
//!
//! The pipeline is built once at startup from the plugin registry and applied
//! per request. Async render hooks form an outer shell around sync render
//! hooks, which wrap the core component render; within each round the
//! first-registered plugin is outermost. Every hook receives a continuation
//! ([`RenderNext`] or [`AsyncRenderNext`]) it must invoke exactly once:
//! skipping it fails the request, and calling it twice is impossible because
//! the continuation consumes itself.
//!
//! Hooks contribute [`Style`] fragments and entrypoint scripts through their
//! [`HookContext`]. Contributions land in per-plugin slots and are merged in
//! registration order during assembly, so output order never depends on when
//! a hook pushed during its round.
//!
//! # Examples
//!
//! ```rust
//! use nori::plugins::Plugin;
//! use nori::render::Style;
//! use serde_json::json;
//!
//! let plugin = Plugin::builder("theme")
//!     .entrypoint("boot", "/static/boot.js")
//!     .render(|ctx, next| {
//!         let page = next.render()?;
//!         ctx.style(Style::new("body { margin: 0; }"));
//!         if page.requires_hydration {
//!             ctx.script("boot", json!({ "mode": "islands" }));
//!         }
//!         Ok(())
//!     })
//!     .build()?;
//! # anyhow::Ok(())
//! ```

use std::{collections::HashMap, sync::Arc};

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    error::{ConfigError, RenderError},
    markup::{self, Component, RenderedPage},
    plugins::PluginRegistry,
};

/// Sync render hook, boxed for storage in a plugin record.
pub type BoxRenderHook =
    Arc<dyn Fn(&mut HookContext, RenderNext) -> anyhow::Result<()> + Send + Sync>;

/// Async render hook, boxed for storage in a plugin record.
pub type BoxAsyncRenderHook =
    Arc<dyn Fn(HookContext, AsyncRenderNext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A style fragment injected into the rendered document's `<head>`.
#[derive(Clone, Debug)]
pub struct Style {
    pub css_text: String,
    pub id: Option<String>,
    pub media: Option<String>,
}

impl Style {
    pub fn new(css_text: impl Into<String>) -> Self {
        Self {
            css_text: css_text.into(),
            id: None,
            media: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }
}

/// What a hook learns from its continuation once the wrapped layers ran.
#[derive(Clone, Copy, Debug)]
pub struct RenderSummary {
    /// True iff the rendered tree contains at least one island. Threaded
    /// out unchanged through every wrapping hook.
    pub requires_hydration: bool,
}

/// Fully assembled page, ready to be sent as `text/html`.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub html: String,
    pub requires_hydration: bool,
}

#[derive(Clone)]
struct ScriptEntry {
    entrypoint: String,
    state: Value,
}

#[derive(Default)]
struct Contribution {
    styles: Vec<Style>,
    scripts: Vec<ScriptEntry>,
}

/// Request-scoped render state shared by the nested layers of one request.
/// Never global: concurrent requests each get their own instance.
struct RenderState {
    contributions: Vec<Contribution>,
    page: Option<RenderedPage>,
    entered: usize,
    failed: Option<RenderError>,
}

impl RenderState {
    fn new(slots: usize) -> Self {
        Self {
            contributions: (0..slots).map(|_| Contribution::default()).collect(),
            page: None,
            entered: 0,
            failed: None,
        }
    }
}

struct SyncLayer {
    plugin: String,
    slot: usize,
    hook: BoxRenderHook,
}

struct AsyncLayer {
    plugin: String,
    slot: usize,
    hook: BoxAsyncRenderHook,
}

struct Shared {
    plugin_names: Vec<String>,
    sync_layers: Vec<SyncLayer>,
    async_layers: Vec<AsyncLayer>,
    entrypoints: HashMap<String, String>,
}

/// Handle through which a hook contributes styles and scripts for the page
/// being rendered. Writes go to the owning plugin's slot in the per-request
/// state; locks are held only for the duration of each push.
pub struct HookContext {
    slot: usize,
    state: Arc<Mutex<RenderState>>,
}

impl HookContext {
    /// Queues a style fragment for the document `<head>`.
    pub fn style(&mut self, style: Style) {
        self.state.lock().contributions[self.slot].styles.push(style);
    }

    /// Queues a client script: the named entrypoint module is imported and
    /// its default export invoked with `state` at load time.
    pub fn script(&mut self, entrypoint: impl Into<String>, state: Value) {
        self.state.lock().contributions[self.slot]
            .scripts
            .push(ScriptEntry {
                entrypoint: entrypoint.into(),
                state,
            });
    }
}

/// Continuation for sync render hooks. Consuming `render` makes a second
/// invocation unrepresentable; dropping it without calling fails the request.
pub struct RenderNext {
    idx: usize,
    shared: Arc<Shared>,
    state: Arc<Mutex<RenderState>>,
    component: Arc<dyn Component>,
}

impl RenderNext {
    /// Runs the remaining inner sync hooks and the core component render.
    pub fn render(self) -> Result<RenderSummary, RenderError> {
        self.state.lock().entered += 1;

        match run_sync_layer(&self.shared, self.idx, &self.state, &self.component) {
            Ok(()) => Ok(summary_of(&self.state)),
            Err(err) => {
                // Keep a copy so the failure survives a swallowing hook.
                self.state.lock().failed = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Continuation for async render hooks; wraps the remaining async hooks and
/// the entire sync round.
pub struct AsyncRenderNext {
    idx: usize,
    shared: Arc<Shared>,
    state: Arc<Mutex<RenderState>>,
    component: Arc<dyn Component>,
}

impl AsyncRenderNext {
    /// Runs the remaining inner layers down to the core component render.
    pub async fn render(self) -> Result<RenderSummary, RenderError> {
        self.state.lock().entered += 1;

        match run_async_layer(self.shared, self.idx, self.state.clone(), self.component).await {
            Ok(()) => Ok(summary_of(&self.state)),
            Err(err) => {
                self.state.lock().failed = Some(err.clone());
                Err(err)
            }
        }
    }
}

fn summary_of(state: &Arc<Mutex<RenderState>>) -> RenderSummary {
    let state = state.lock();
    RenderSummary {
        requires_hydration: state
            .page
            .as_ref()
            .map(|p| p.requires_hydration)
            .unwrap_or(false),
    }
}

/// Ordered hook pipeline plus the entrypoint table, built once at startup.
pub struct RenderPipeline {
    shared: Arc<Shared>,
}

impl RenderPipeline {
    /// Compiles the registry into an applied-per-request pipeline.
    ///
    /// Fails when two plugins declare the same entrypoint name.
    pub fn from_registry(registry: &PluginRegistry) -> Result<Self, ConfigError> {
        let mut plugin_names = Vec::with_capacity(registry.len());
        let mut sync_layers = Vec::new();
        let mut async_layers = Vec::new();
        let mut entrypoints = HashMap::new();
        let mut owners: HashMap<String, String> = HashMap::new();

        for (slot, plugin) in registry.iter().enumerate() {
            plugin_names.push(plugin.name().to_owned());

            if let Some(hook) = plugin.render_hook() {
                sync_layers.push(SyncLayer {
                    plugin: plugin.name().to_owned(),
                    slot,
                    hook: hook.clone(),
                });
            }
            if let Some(hook) = plugin.render_async_hook() {
                async_layers.push(AsyncLayer {
                    plugin: plugin.name().to_owned(),
                    slot,
                    hook: hook.clone(),
                });
            }

            for (name, specifier) in plugin.entrypoints() {
                if let Some(first) = owners.insert(name.clone(), plugin.name().to_owned()) {
                    return Err(ConfigError::DuplicateEntrypoint {
                        entrypoint: name.clone(),
                        first,
                        second: plugin.name().to_owned(),
                    });
                }
                entrypoints.insert(name.clone(), specifier.clone());
            }
        }

        tracing::debug!(
            sync_hooks = sync_layers.len(),
            async_hooks = async_layers.len(),
            entrypoints = entrypoints.len(),
            "render pipeline built"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                plugin_names,
                sync_layers,
                async_layers,
                entrypoints,
            }),
        })
    }

    /// Renders one page through every registered hook and assembles the
    /// final document.
    pub async fn render_page(
        &self,
        component: Arc<dyn Component>,
    ) -> Result<RenderOutput, RenderError> {
        let state = Arc::new(Mutex::new(RenderState::new(self.shared.plugin_names.len())));

        run_async_layer(self.shared.clone(), 0, state.clone(), component).await?;

        let (page, contributions) = {
            let mut state = state.lock();
            let page = state.page.take().expect("core render completed");
            let contributions = std::mem::take(&mut state.contributions);
            (page, contributions)
        };

        assemble(&self.shared, page, contributions)
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("plugins", &self.shared.plugin_names)
            .field("sync_layers", &self.shared.sync_layers.len())
            .field("async_layers", &self.shared.async_layers.len())
            .field("entrypoints", &self.shared.entrypoints.len())
            .finish()
    }
}

fn run_async_layer(
    shared: Arc<Shared>,
    idx: usize,
    state: Arc<Mutex<RenderState>>,
    component: Arc<dyn Component>,
) -> BoxFuture<'static, Result<(), RenderError>> {
    Box::pin(async move {
        if idx == shared.async_layers.len() {
            // Innermost async layer: the whole sync round runs as one
            // non-preemptible pass, no await points.
            return run_sync_layer(&shared, 0, &state, &component);
        }

        let layer = &shared.async_layers[idx];
        let ctx = HookContext {
            slot: layer.slot,
            state: state.clone(),
        };
        let next = AsyncRenderNext {
            idx: idx + 1,
            shared: shared.clone(),
            state: state.clone(),
            component: component.clone(),
        };
        let entered_before = state.lock().entered;

        let result = (layer.hook)(ctx, next).await;

        finish_layer(&layer.plugin, result, &state, entered_before)
    })
}

fn run_sync_layer(
    shared: &Arc<Shared>,
    idx: usize,
    state: &Arc<Mutex<RenderState>>,
    component: &Arc<dyn Component>,
) -> Result<(), RenderError> {
    if idx == shared.sync_layers.len() {
        let page = markup::render_component(component.as_ref())?;
        state.lock().page = Some(page);
        return Ok(());
    }

    let layer = &shared.sync_layers[idx];
    let mut ctx = HookContext {
        slot: layer.slot,
        state: state.clone(),
    };
    let next = RenderNext {
        idx: idx + 1,
        shared: shared.clone(),
        state: state.clone(),
        component: component.clone(),
    };
    let entered_before = state.lock().entered;

    let result = (layer.hook)(&mut ctx, next);

    finish_layer(&layer.plugin, result, state, entered_before)
}

/// Applies the hook contract after a layer returns: an inner failure wins
/// over whatever the hook reported, a hook error fails the request, and a
/// continuation left uncalled is a terminal error naming the plugin.
fn finish_layer(
    plugin: &str,
    result: anyhow::Result<()>,
    state: &Arc<Mutex<RenderState>>,
    entered_before: usize,
) -> Result<(), RenderError> {
    if let Some(err) = state.lock().failed.take() {
        return Err(err);
    }

    match result {
        Err(cause) => Err(RenderError::Hook {
            plugin: plugin.to_owned(),
            cause: Arc::new(cause),
        }),
        Ok(()) => {
            if state.lock().entered == entered_before {
                Err(RenderError::ContinuationNotCalled {
                    plugin: plugin.to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }
}

/// Builds the final document: head metadata and styles, body markup, then
/// entrypoint initializer scripts. Contribution slots are walked in
/// registration order.
fn assemble(
    shared: &Shared,
    page: RenderedPage,
    contributions: Vec<Contribution>,
) -> Result<RenderOutput, RenderError> {
    let mut head = String::from("<meta charset=\"utf-8\">");
    if let Some(title) = &page.title {
        head.push_str(&format!("<title>{}</title>", markup::escape_text(title)));
    }

    let mut scripts = String::new();
    for (slot, contribution) in contributions.into_iter().enumerate() {
        for style in contribution.styles {
            head.push_str("<style");
            if let Some(id) = &style.id {
                head.push_str(&format!(" id=\"{}\"", markup::escape_attr(id)));
            }
            if let Some(media) = &style.media {
                head.push_str(&format!(" media=\"{}\"", markup::escape_attr(media)));
            }
            head.push('>');
            head.push_str(&style.css_text);
            head.push_str("</style>");
        }

        for script in contribution.scripts {
            let specifier = shared.entrypoints.get(&script.entrypoint).ok_or_else(|| {
                RenderError::UnknownEntrypoint {
                    plugin: shared.plugin_names[slot].clone(),
                    entrypoint: script.entrypoint.clone(),
                }
            })?;

            let module =
                serde_json::to_string(specifier).map_err(|e| RenderError::ScriptState {
                    entrypoint: script.entrypoint.clone(),
                    reason: e.to_string(),
                })?;
            let state =
                serde_json::to_string(&script.state).map_err(|e| RenderError::ScriptState {
                    entrypoint: script.entrypoint.clone(),
                    reason: e.to_string(),
                })?;

            scripts.push_str(&format!(
                "<script type=\"module\">import init from {}; init({});</script>",
                escape_script_payload(&module),
                escape_script_payload(&state),
            ));
        }
    }

    let html = format!(
        "<!DOCTYPE html><html><head>{head}</head><body>{}{scripts}</body></html>",
        page.html
    );

    Ok(RenderOutput {
        html,
        requires_hydration: page.requires_hydration,
    })
}

/// Escapes `<` in a JSON payload so it can be inlined into a `<script>`
/// element without terminating it early. In JSON, `<` only occurs inside
/// string literals, where `<` is an equivalent escape.
fn escape_script_payload(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;

    use super::*;
    use crate::markup::{Element, Island, Node};
    use crate::plugins::Plugin;

    struct Body(&'static str);

    impl Component for Body {
        fn render(&self) -> Node {
            Element::new("main").text(self.0).into()
        }

        fn title(&self) -> Option<String> {
            Some("test page".to_string())
        }
    }

    struct IslandPage;

    impl Component for IslandPage {
        fn render(&self) -> Node {
            Element::new("main")
                .child(Island::new("counter", json!({ "n": 1 })))
                .into()
        }
    }

    fn pipeline(plugins: Vec<Plugin>) -> RenderPipeline {
        let mut registry = PluginRegistry::new();
        for plugin in plugins {
            registry.register(plugin).unwrap();
        }
        RenderPipeline::from_registry(&registry).unwrap()
    }

    fn style_plugin(name: &str, css: &str) -> Plugin {
        let css = css.to_owned();
        Plugin::builder(name)
            .render(move |ctx, next| {
                next.render()?;
                ctx.style(Style::new(css.clone()));
                Ok(())
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_styles_follow_registration_order() {
        let p = pipeline(vec![
            style_plugin("first", ".a{}"),
            style_plugin("second", ".b{}"),
        ]);
        let out = p.render_page(Arc::new(Body("hello"))).await.unwrap();

        let a = out.html.find(".a{}").unwrap();
        let b = out.html.find(".b{}").unwrap();
        let head_end = out.html.find("</head>").unwrap();
        assert!(a < b);
        assert!(b < head_end);
    }

    #[tokio::test]
    async fn test_contribution_order_ignores_push_timing() {
        // The outer (first-registered) hook pushes after its continuation
        // returns, so temporally last; output order must still follow
        // registration order.
        let outer = Plugin::builder("outer")
            .render(|ctx, next| {
                next.render()?;
                ctx.style(Style::new(".outer{}"));
                Ok(())
            })
            .build()
            .unwrap();
        let inner = Plugin::builder("inner")
            .render(|ctx, next| {
                ctx.style(Style::new(".inner{}"));
                next.render()?;
                Ok(())
            })
            .build()
            .unwrap();

        let p = pipeline(vec![outer, inner]);
        let out = p.render_page(Arc::new(Body("x"))).await.unwrap();

        assert!(out.html.find(".outer{}").unwrap() < out.html.find(".inner{}").unwrap());
    }

    #[tokio::test]
    async fn test_missing_continuation_is_terminal() {
        let p = pipeline(vec![
            Plugin::builder("lazy")
                .render(|_ctx, _next| Ok(()))
                .build()
                .unwrap(),
        ]);
        let err = p.render_page(Arc::new(Body("x"))).await.unwrap_err();

        assert!(
            matches!(err, RenderError::ContinuationNotCalled { ref plugin } if plugin == "lazy")
        );
    }

    #[tokio::test]
    async fn test_missing_async_continuation_is_terminal() {
        let p = pipeline(vec![
            Plugin::builder("lazy")
                .render_async(|_ctx, _next| async { anyhow::Ok(()) })
                .build()
                .unwrap(),
        ]);
        let err = p.render_page(Arc::new(Body("x"))).await.unwrap_err();

        assert!(
            matches!(err, RenderError::ContinuationNotCalled { ref plugin } if plugin == "lazy")
        );
    }

    #[tokio::test]
    async fn test_async_hooks_wrap_sync_hooks() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::<&'static str>::new()));

        let ev = events.clone();
        let sync_plugin = Plugin::builder("sync_side")
            .render(move |_ctx, next| {
                ev.lock().push("sync_enter");
                next.render()?;
                ev.lock().push("sync_exit");
                Ok(())
            })
            .build()
            .unwrap();

        let ev = events.clone();
        let async_plugin = Plugin::builder("async_side")
            .render_async(move |_ctx, next| {
                let ev = ev.clone();
                async move {
                    ev.lock().push("async_enter");
                    next.render().await?;
                    ev.lock().push("async_exit");
                    anyhow::Ok(())
                }
            })
            .build()
            .unwrap();

        // The sync plugin registers first; the async hook must still wrap it.
        let p = pipeline(vec![sync_plugin, async_plugin]);
        p.render_page(Arc::new(Body("x"))).await.unwrap();

        assert_eq!(
            *events.lock(),
            vec!["async_enter", "sync_enter", "sync_exit", "async_exit"]
        );
    }

    #[tokio::test]
    async fn test_first_registered_hook_is_outermost() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::<&'static str>::new()));

        let ev = events.clone();
        let a = Plugin::builder("aaa")
            .render(move |_ctx, next| {
                ev.lock().push("a_enter");
                next.render()?;
                ev.lock().push("a_exit");
                Ok(())
            })
            .build()
            .unwrap();

        let ev = events.clone();
        let b = Plugin::builder("bbb")
            .render(move |_ctx, next| {
                ev.lock().push("b_enter");
                next.render()?;
                ev.lock().push("b_exit");
                Ok(())
            })
            .build()
            .unwrap();

        let p = pipeline(vec![a, b]);
        p.render_page(Arc::new(Body("x"))).await.unwrap();

        assert_eq!(
            *events.lock(),
            vec!["a_enter", "b_enter", "b_exit", "a_exit"]
        );
    }

    #[tokio::test]
    async fn test_hydration_flag_reaches_hooks_and_output() {
        let seen = Arc::new(parking_lot::Mutex::new(None));

        let seen_in_hook = seen.clone();
        let probe = Plugin::builder("probe")
            .render(move |_ctx, next| {
                let summary = next.render()?;
                *seen_in_hook.lock() = Some(summary.requires_hydration);
                Ok(())
            })
            .build()
            .unwrap();

        let p = pipeline(vec![probe]);

        let out = p.render_page(Arc::new(IslandPage)).await.unwrap();
        assert!(out.requires_hydration);
        assert_eq!(*seen.lock(), Some(true));

        let out = p.render_page(Arc::new(Body("static"))).await.unwrap();
        assert!(!out.requires_hydration);
        assert_eq!(*seen.lock(), Some(false));
    }

    #[tokio::test]
    async fn test_concurrent_requests_stay_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_in_hook = calls.clone();
        let tagger = Plugin::builder("tagger")
            .render_async(move |mut ctx, next| {
                let n = calls_in_hook.fetch_add(1, Ordering::SeqCst);
                async move {
                    ctx.style(Style::new(format!(".req-{n} {{}}")));
                    tokio::task::yield_now().await;
                    next.render().await?;
                    tokio::task::yield_now().await;
                    ctx.style(Style::new(format!(".req-{n}-after {{}}")));
                    anyhow::Ok(())
                }
            })
            .build()
            .unwrap();

        let p = pipeline(vec![tagger]);
        let (a, b) = futures_util::future::join(
            p.render_page(Arc::new(Body("alpha"))),
            p.render_page(Arc::new(Body("beta"))),
        )
        .await;
        let a = a.unwrap();
        let b = b.unwrap();

        assert!(a.html.contains("alpha") && !a.html.contains("beta"));
        assert!(b.html.contains("beta") && !b.html.contains("alpha"));

        for out in [&a, &b] {
            let n = (0..2)
                .find(|i| out.html.contains(&format!(".req-{i} {{}}")))
                .unwrap();
            assert!(out.html.contains(&format!(".req-{n}-after {{}}")));
            let other = 1 - n;
            assert!(!out.html.contains(&format!(".req-{other} ")));
            assert!(!out.html.contains(&format!(".req-{other}-after")));
        }
    }

    #[tokio::test]
    async fn test_hook_error_fails_the_request() {
        let p = pipeline(vec![
            Plugin::builder("failing")
                .render(|_ctx, next| {
                    next.render()?;
                    Err(anyhow::anyhow!("boom"))
                })
                .build()
                .unwrap(),
        ]);
        let err = p.render_page(Arc::new(Body("x"))).await.unwrap_err();

        assert!(matches!(err, RenderError::Hook { ref plugin, .. } if plugin == "failing"));
    }

    #[tokio::test]
    async fn test_inner_hook_error_survives_swallowing() {
        let swallow = Plugin::builder("swallow")
            .render_async(|_ctx, next| async move {
                let _ = next.render().await;
                anyhow::Ok(())
            })
            .build()
            .unwrap();
        let failing = Plugin::builder("failing")
            .render(|_ctx, next| {
                next.render()?;
                Err(anyhow::anyhow!("boom"))
            })
            .build()
            .unwrap();

        let p = pipeline(vec![swallow, failing]);
        let err = p.render_page(Arc::new(Body("x"))).await.unwrap_err();

        assert!(matches!(err, RenderError::Hook { ref plugin, .. } if plugin == "failing"));
    }

    #[tokio::test]
    async fn test_script_injection_resolves_entrypoint() {
        let p = pipeline(vec![
            Plugin::builder("scripted")
                .entrypoint("boot", "/static/boot.js")
                .render(|ctx, next| {
                    next.render()?;
                    ctx.script("boot", json!({ "msg": "<tag>" }));
                    Ok(())
                })
                .build()
                .unwrap(),
        ]);
        let out = p.render_page(Arc::new(Body("x"))).await.unwrap();

        assert!(out.html.contains("import init from \"/static/boot.js\""));
        assert!(out.html.contains("\\u003ctag>"));

        let script = out.html.find("<script type=\"module\"").unwrap();
        assert!(script > out.html.find("</head>").unwrap());
        assert!(script < out.html.find("</body>").unwrap());
    }

    #[tokio::test]
    async fn test_unknown_entrypoint_fails_render() {
        let p = pipeline(vec![
            Plugin::builder("scripted")
                .render(|ctx, next| {
                    next.render()?;
                    ctx.script("missing", json!({}));
                    Ok(())
                })
                .build()
                .unwrap(),
        ]);
        let err = p.render_page(Arc::new(Body("x"))).await.unwrap_err();

        assert!(matches!(
            err,
            RenderError::UnknownEntrypoint { ref plugin, ref entrypoint }
                if plugin == "scripted" && entrypoint == "missing"
        ));
    }

    #[tokio::test]
    async fn test_style_attributes_are_rendered() {
        let p = pipeline(vec![
            Plugin::builder("styled")
                .render(|ctx, next| {
                    next.render()?;
                    ctx.style(Style::new(".x{}").id("main-css").media("print"));
                    Ok(())
                })
                .build()
                .unwrap(),
        ]);
        let out = p.render_page(Arc::new(Body("x"))).await.unwrap();

        assert!(
            out.html
                .contains("<style id=\"main-css\" media=\"print\">.x{}</style>")
        );
    }

    #[test]
    fn test_duplicate_entrypoints_rejected() {
        let a = Plugin::builder("one")
            .entrypoint("boot", "/a.js")
            .build()
            .unwrap();
        let b = Plugin::builder("two")
            .entrypoint("boot", "/b.js")
            .build()
            .unwrap();

        let mut registry = PluginRegistry::new();
        registry.register(a).unwrap();
        registry.register(b).unwrap();

        let err = RenderPipeline::from_registry(&registry).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateEntrypoint { ref entrypoint, .. } if entrypoint == "boot"
        ));
    }

    #[tokio::test]
    async fn test_plain_pipeline_renders_document() {
        let p = pipeline(Vec::new());
        let out = p.render_page(Arc::new(Body("plain"))).await.unwrap();

        assert!(out.html.starts_with("<!DOCTYPE html>"));
        assert!(out.html.contains("<title>test page</title>"));
        assert!(out.html.contains("<main>plain</main>"));
        assert!(!out.requires_hydration);
    }
}
