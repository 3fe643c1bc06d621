use crate::body::Body;
use crate::error::Error;
use crate::headers::Headers;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

/// An inbound HTTP result.
///
/// The body is consumed at most once, by exactly one of the decoders.
#[derive(Debug, Default)]
pub struct Response {
    /// The response's status.
    pub status: StatusCode,

    /// The response's headers.
    pub headers: Headers,

    /// The response body.
    pub body: Body,
}

impl Response {
    pub fn new(status: StatusCode) -> Response {
        Response {
            status,
            headers: Headers::new(),
            body: Body::empty(),
        }
    }

    /// Whether the status is in the success range.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Read the raw body bytes.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        self.body.into_bytes().await
    }

    /// Read the body as UTF-8 text.
    pub async fn text(self) -> Result<String, Error> {
        let bytes = self.body.into_bytes().await?;

        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Parse the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let bytes = self.body.into_bytes().await?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Decode the body as a url-encoded form.
    pub async fn form(self) -> Result<Vec<(String, String)>, Error> {
        let bytes = self.body.into_bytes().await?;

        Ok(serde_urlencoded::from_bytes(&bytes)?)
    }
}
