use crate::body::Body;
use crate::headers::Headers;
use crate::hooks::Hooks;
use crate::query::QueryParams;
use crate::response::Response;
use crate::transport::{BoxModifier, BoxTransport};

use bytes::Bytes;
use http::Method;
use tokio_util::sync::CancellationToken;
use url::Url;

/// An outbound HTTP call.
///
/// A request is treated as read-only by the pipeline; hooks and transport
/// modifiers communicate changes by producing a *replacement* request,
/// never by mutating one another party still holds.
#[derive(Debug)]
pub struct Request {
    /// The request's method.
    pub method: Method,

    /// The request's target URL.
    pub url: Url,

    /// The request's headers.
    pub headers: Headers,

    /// The request body.
    pub body: Body,

    /// Cancellation signal wired through to the transport.
    pub signal: Option<CancellationToken>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Request {
        Request {
            method,
            url,
            headers: Headers::new(),
            body: Body::empty(),
            signal: None,
        }
    }

    /// Clone this request with a best-effort body clone.
    ///
    /// A stream-backed body cannot be cloned and is replaced by an empty
    /// one. Used for error payloads, which outlive the dispatched request.
    pub fn snapshot(&self) -> Request {
        Request {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone().unwrap_or_default(),
            signal: self.signal.clone(),
        }
    }
}

/// How the response body is decoded, and which `accept` header is
/// preferred when none was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Parse the body as JSON. Prefers `accept: application/json`.
    Json,
    /// Read the body as UTF-8 text. Prefers `accept: text/*`.
    Text,
    /// Read the raw body bytes.
    Bytes,
    /// Decode the body as a url-encoded form.
    Form,
    /// Return the response itself, body unread.
    Raw,
    /// Discard the response, body unread.
    Void,
}

/// The decoded result of a dispatched request.
#[derive(Debug)]
pub enum Decoded {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
    Form(Vec<(String, String)>),
    Raw(Response),
    Void,
}

impl Decoded {
    /// The raw response, if the request was dispatched undecoded.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Decoded::Raw(response) => Some(response),
            _ => None,
        }
    }

    /// The decoded JSON value, if any.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Decoded::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The decoded text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            Decoded::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Per-call configuration for [`Client::dispatch`](crate::Client::dispatch).
#[derive(Default)]
pub struct RequestOptions {
    /// The HTTP method. Defaults to GET.
    pub method: Method,

    /// Headers merged into the outgoing request.
    pub headers: Headers,

    /// Replaces the target URL's query string when set.
    pub query: Option<QueryParams>,

    /// Serialized to the body, replacing any previously set body, and
    /// forcing `content-type: application/json` unless already set.
    pub json: Option<serde_json::Value>,

    /// The request body. Ignored when `json` is set.
    pub body: Option<Bytes>,

    /// Governs body decoding and the default `accept` header. When absent
    /// the response is returned unread.
    pub response_kind: Option<ResponseKind>,

    /// Overrides the client's default transport for this call.
    pub transport: Option<BoxTransport>,

    /// Transport-wrapping modifiers; the first entry is the outermost.
    pub modifiers: Vec<BoxModifier>,

    /// Pre-request and post-response hooks.
    pub hooks: Hooks,

    /// Caller-supplied cancellation token.
    pub signal: Option<CancellationToken>,

    /// Custom user data, e.g. a token. Can be read by hooks.
    pub context: serde_json::Value,
}
