use std::net::SocketAddr;

use http::Method;
use nori::{
    markup::{Component, Element, Island, Node},
    middleware::Next,
    plugins::{Plugin, live_reload::LiveReloadBuilder, security_headers::SecurityHeadersBuilder},
    render::Style,
    responder::Responder,
    router::Router,
    types::Request,
};
use serde_json::json;

struct HomePage;

impl Component for HomePage {
    fn title(&self) -> Option<String> {
        Some("nori demo".to_string())
    }

    fn render(&self) -> Node {
        Element::new("main")
            .child(Element::new("h1").text("Hello from nori"))
            .child(
                Island::new("counter", json!({ "start": 3 }))
                    .child(Node::text("loading counter")),
            )
            .into()
    }
}

async fn whoami(req: Request) -> impl Responder {
    req.extensions()
        .get::<SocketAddr>()
        .map(|addr| format!("you are {addr}"))
        .unwrap_or_else(|| "you are unknown".to_string())
}

async fn log_requests(req: Request, next: Next) -> impl Responder {
    tracing::debug!(path = %req.uri().path(), "incoming request");
    next.run(req).await.into_response()
}

fn theme_plugin() -> Plugin {
    Plugin::builder("theme")
        .entrypoint("counter", "/static/counter.js")
        .render(|ctx, next| {
            let page = next.render()?;
            ctx.style(Style::new("body { font-family: sans-serif; }"));
            if page.requires_hydration {
                ctx.script("counter", json!({ "start": 3 }));
            }
            Ok(())
        })
        .build()
        .expect("theme plugin definition is valid")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;

    let mut router = Router::new();
    router.middleware(log_requests);
    router.page("/", HomePage);
    router.route(Method::GET, "/whoami", whoami);
    router.plugin(theme_plugin());
    router.plugin(SecurityHeadersBuilder::new().build());
    router.plugin(LiveReloadBuilder::new().build());

    nori::serve(listener, router).await
}
