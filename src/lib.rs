pub mod body;
pub mod error;
pub mod handler;
pub mod markup;
pub mod middleware;
pub mod plugins;
pub mod render;
pub mod responder;
pub mod route;
pub mod router;
pub mod server;
pub mod types;

pub use http::Method;
pub use server::serve;

#[cfg(feature = "nori-tracing")]
pub mod tracing;
