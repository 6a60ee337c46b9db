//! Conversion of handler return values into HTTP responses.
//!
//! The `Responder` trait lets handlers and middleware return plain values
//! (`&str`, `String`, status/body tuples, `Html`, `Json`) that are converted
//! into `Response` objects at the call site.
//!
//! # Examples
//!
//! ```rust
//! use nori::responder::Responder;
//! use http::StatusCode;
//!
//! let response = "Hello, World!".into_response();
//! let response = (StatusCode::OK, "Success").into_response();
//! let response = ().into_response();
//! ```

use std::{convert::Infallible, fmt::Display};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::Serialize;

use crate::{body::NoriBody, types::Response};

/// Trait for converting values into HTTP responses.
pub trait Responder {
    /// Converts the implementing type into an HTTP response.
    fn into_response(self) -> Response;
}

impl Responder for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl Responder for NoriBody {
    fn into_response(self) -> Response {
        Response::new(self)
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Response {
        Response::new(NoriBody::new(Full::from(Bytes::from_static(
            self.as_bytes(),
        ))))
    }
}

impl Responder for String {
    fn into_response(self) -> Response {
        Response::new(NoriBody::new(Full::from(Bytes::from(self))))
    }
}

impl Responder for () {
    fn into_response(self) -> Response {
        Response::new(NoriBody::empty())
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Response {
        match self {}
    }
}

impl<R> Responder for (StatusCode, R)
where
    R: Display,
{
    fn into_response(self) -> Response {
        let (status, body) = self;
        let mut res = Response::new(NoriBody::new(Full::from(Bytes::from(body.to_string()))));
        *res.status_mut() = status;
        res
    }
}

/// Marks the wrapped markup as a `text/html` response.
///
/// Used by the router for rendered pages and available to handlers that
/// produce HTML themselves.
pub struct Html<T>(pub T);

impl<T> Responder for Html<T>
where
    T: Into<String>,
{
    fn into_response(self) -> Response {
        let mut res = Response::new(NoriBody::from(self.0.into()));
        res.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        res
    }
}

/// Serializes the wrapped value as an `application/json` response.
pub struct Json<T>(pub T);

impl<T> Responder for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(buf) => {
                let mut res = Response::new(NoriBody::from(Bytes::from(buf)));
                res.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                res
            }
            Err(err) => {
                tracing::error!(error = %err, "json response serialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization failed").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_sets_content_type() {
        let res = Html("<p>hi</p>").into_response();
        assert_eq!(
            res.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_json_sets_content_type() {
        let res = Json(serde_json::json!({ "ok": true })).into_response();
        assert_eq!(res.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_status_tuple_sets_status() {
        let res = (StatusCode::NOT_FOUND, "missing").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
