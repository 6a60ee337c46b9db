//! Body wrapper used by every request and response in the framework.
//!
//! `NoriBody` boxes any `http_body::Body` implementation with `Bytes` data
//! so handlers, middleware and the render pipeline can pass bodies around
//! without generic plumbing.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::body::{Body, Frame, SizeHint};

use crate::types::{BoxBody, BoxError};

/// Boxed HTTP body with erased error type.
///
/// # Example
///
/// ```rust
/// use nori::body::NoriBody;
///
/// let empty = NoriBody::empty();
/// let text = NoriBody::from("Hello, world!".to_string());
/// ```
pub struct NoriBody(BoxBody);

impl NoriBody {
    /// Wraps any compatible body implementation.
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(|e| e.into()).boxed_unsync())
    }

    /// Creates a body with no data frames.
    pub fn empty() -> Self {
        Self::new(Empty::new())
    }
}

impl Default for NoriBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<()> for NoriBody {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

macro_rules! body_from_impl {
    ($ty:ty) => {
        impl From<$ty> for NoriBody {
            fn from(buf: $ty) -> Self {
                Self::new(http_body_util::Full::from(buf))
            }
        }
    };
}

body_from_impl!(String);
body_from_impl!(Bytes);

impl Body for NoriBody {
    type Data = Bytes;
    type Error = BoxError;

    #[inline]
    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.0).poll_frame(cx)
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.0.size_hint()
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream()
    }
}
