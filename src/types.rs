use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body_util::combinators::UnsyncBoxBody;

use crate::{body::NoriBody, middleware::Next};

pub type BoxBody = UnsyncBoxBody<Bytes, BoxError>;
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Incoming request with the framework body type.
pub type Request = http::Request<NoriBody>;
/// Outgoing response with the framework body type.
pub type Response = http::Response<NoriBody>;

/// Middleware stored in the router chain, boxed for uniform dispatch.
pub type BoxMiddleware = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;
