//! HTTP server loop and lifecycle.
//!
//! Built on Hyper: accepts TCP connections, hands each one to its own tokio
//! task and dispatches requests through the router. Plugin composition runs
//! once, before the accept loop, so configuration errors abort startup.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nori::{Method, router::Router, types::Request};
//! use tokio::net::TcpListener;
//!
//! async fn hello(_: Request) -> &'static str {
//!     "Hello, World!"
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//! let mut router = Router::new();
//! router.route(Method::GET, "/", hello);
//! nori::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::{convert::Infallible, sync::Arc};

use anyhow::Result;
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use tokio::net::TcpListener;

use crate::{body::NoriBody, router::Router, types::Request};

/// Starts the HTTP server with the given listener and router.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    run(listener, router).await
}

/// Accept loop: composes the router, then serves each connection in its own
/// task with HTTP/1.1 keep-alive.
async fn run(listener: TcpListener, router: Router) -> Result<()> {
    #[cfg(feature = "nori-tracing")]
    crate::tracing::init_tracing();

    let router = Arc::new(router);
    router.compose()?;

    tracing::info!(addr = %listener.local_addr()?, "nori listening");

    loop {
        let (stream, addr) = listener.accept().await?;
        let io = hyper_util::rt::TokioIo::new(stream);
        let router = router.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req: hyper::Request<Incoming>| {
                let router = router.clone();
                async move {
                    let (parts, body) = req.into_parts();
                    let mut req = Request::from_parts(parts, NoriBody::new(body));
                    req.extensions_mut().insert(addr);
                    Ok::<_, Infallible>(router.dispatch(req).await)
                }
            });

            let mut http = http1::Builder::new();
            http.keep_alive(true);
            let conn = http.serve_connection(io, svc);

            if let Err(err) = conn.await {
                tracing::warn!(error = %err, "error serving connection");
            }
        });
    }
}
