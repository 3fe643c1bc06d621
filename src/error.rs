use crate::request::Request;
use crate::response::Response;

use std::fmt;

/// A type-erased error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Any error that can occur while dispatching a request.
///
/// Failures produced by an injected [`Transport`](crate::Transport) are
/// surfaced unchanged; the pipeline never wraps them in another variant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The base URL was malformed, or a relative path had no base.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A response was received, but its status indicates failure.
    #[error("{0}")]
    Http(Box<HttpError>),

    /// The deadline elapsed before the transport settled.
    #[error("{0}")]
    Timeout(Box<TimeoutError>),

    /// Failed to serialize or deserialize a JSON body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode a url-encoded form body.
    #[error("form error: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// A text body was not valid UTF-8.
    #[error("invalid UTF-8 in body: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The body was already consumed.
    #[error("body already consumed")]
    BodyConsumed,

    /// A failure raised by the underlying transport.
    #[error("transport error: {0}")]
    Transport(BoxError),
}

impl Error {
    /// Create an [`Error::Http`] from the request/response pair.
    pub fn http(request: Request, response: Response) -> Self {
        Error::Http(Box::new(HttpError { request, response }))
    }

    /// Create an [`Error::Timeout`] carrying the originating request.
    pub fn timeout(request: Request) -> Self {
        Error::Timeout(Box::new(TimeoutError { request }))
    }
}

/// A response was received with a non-success status.
///
/// Carries the full request and response for caller inspection.
#[derive(Debug)]
pub struct HttpError {
    pub request: Request,
    pub response: Response,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.response.status;

        match status.canonical_reason() {
            Some(reason) => write!(f, "{}", reason),
            None => write!(f, "HTTP error {}", status.as_u16()),
        }
    }
}

impl std::error::Error for HttpError {}

/// The configured deadline elapsed before the transport settled.
///
/// The underlying call may still be running if cancellation was disabled,
/// but its result is discarded.
#[derive(Debug)]
pub struct TimeoutError {
    pub request: Request,
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request timed out")
    }
}

impl std::error::Error for TimeoutError {}
