//! An HTTP request helper layered over an injected transport.
//!
//! `courier` builds requests from a base URL, path, query and fragment,
//! merges array-valued headers, and dispatches through a pipeline of
//! pre-request hooks (which may replace the request or short-circuit with
//! a response), transport modifiers such as [`Timeout`], and post-response
//! hooks. Non-success statuses fail with a typed [`HttpError`]. The actual
//! network call is delegated to whatever [`Transport`] the caller injects.

mod body;
mod client;
mod error;
mod headers;
mod hooks;
mod query;
mod request;
mod response;
mod timeout;
mod transport;
mod url;

pub use async_trait::async_trait;
pub use http::{Method, StatusCode};
pub use ::url::Url;

pub use body::Body;
pub use client::Client;
pub use error::{BoxError, Error, HttpError, TimeoutError};
pub use headers::Headers;
pub use hooks::{after_fn, before_fn, AfterResponse, BeforeRequest, Hooks, Intercept};
pub use query::{IntoValues, QueryParams};
pub use request::{Decoded, Request, RequestOptions, ResponseKind};
pub use response::Response;
pub use timeout::Timeout;
pub use transport::{
    transport_fn, BoxFuture, BoxModifier, BoxTransport, Modifier, Transport, TransportFn,
};
pub use self::url::{create_url, UrlInit};
