use std::sync::Arc;

use crate::{
    handler::BoxHandler,
    responder::Responder,
    types::{BoxMiddleware, Request, Response},
};

/// Continuation handed to each middleware; running it executes the rest of
/// the chain and finally the matched handler.
pub struct Next {
    pub(crate) idx: usize,
    pub(crate) chain: Arc<[BoxMiddleware]>,
    pub(crate) endpoint: BoxHandler,
}

impl Next {
    pub async fn run(mut self, req: Request) -> Response {
        if self.idx < self.chain.len() {
            let mw = self.chain[self.idx].clone();
            self.idx += 1;
            mw(req, self).await
        } else {
            self.endpoint.call(req).await
        }
    }
}

pub(crate) fn into_middleware<F, Fut, R>(f: F) -> BoxMiddleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Responder + Send + 'static,
{
    let mw: BoxMiddleware = Arc::new(move |req, next| {
        let fut = f(req, next);
        Box::pin(async move { fut.await.into_response() })
    });

    mw
}
