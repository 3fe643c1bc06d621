use crate::body::Body;
use crate::error::Error;
use crate::hooks::Intercept;
use crate::request::{Decoded, Request, RequestOptions, ResponseKind};
use crate::response::Response;
use crate::transport::{self, BoxTransport, Transport};

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Dispatches requests through a hook and modifier pipeline.
///
/// The client holds the default transport; `options.transport` overrides
/// it per call. The client itself is stateless across calls: every
/// dispatch builds its own request/response chain, so concurrent calls
/// share nothing.
#[derive(Clone)]
pub struct Client {
    transport: BoxTransport,
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Client {
        Client {
            transport: Arc::new(transport),
        }
    }

    /// Dispatch a single request and decode the response.
    ///
    /// One logical call: no implicit retry, no local recovery. Transport
    /// failures surface unchanged, a non-success status fails with
    /// [`Error::Http`], and hook errors abort the remaining hook chain
    /// for that phase.
    pub async fn dispatch(&self, url: Url, options: RequestOptions) -> Result<Decoded, Error> {
        let mut url = url;

        if let Some(ref query) = options.query {
            if query.is_empty() {
                url.set_query(None);
            } else {
                url.set_query(Some(&query.to_string()));
            }
        }

        let mut headers = options.headers.clone();

        let mut body = options
            .body
            .clone()
            .map(Body::once)
            .unwrap_or_default();

        if let Some(ref json) = options.json {
            body = Body::once(serde_json::to_vec(json)?);

            if !headers.contains("content-type") {
                headers.append("content-type", mime::APPLICATION_JSON.as_ref());
            }
        }

        if !headers.contains("accept") {
            match options.response_kind {
                Some(ResponseKind::Json) => {
                    headers.append("accept", mime::APPLICATION_JSON.as_ref())
                }
                Some(ResponseKind::Text) => headers.append("accept", mime::TEXT_STAR.as_ref()),
                _ => {}
            }
        }

        let mut request = Request {
            method: options.method.clone(),
            url,
            headers,
            body,
            signal: options
                .signal
                .as_ref()
                .map(CancellationToken::child_token),
        };

        let transport = options
            .transport
            .clone()
            .unwrap_or_else(|| self.transport.clone());
        let transport = transport::compose(transport, &options.modifiers);

        debug!(method = %request.method, url = %request.url, "dispatching request");

        let mut short_circuit = None;

        for hook in options.hooks.before_request.clone() {
            match hook.call(&request, &options).await? {
                Intercept::Continue => {}
                Intercept::Replace(replacement) => {
                    request = replacement;
                    break;
                }
                Intercept::Respond(response) => {
                    short_circuit = Some(response);
                    break;
                }
            }
        }

        // Post-response hooks and error payloads outlive the transport
        // call, so they observe a snapshot of the dispatched request.
        let retained = request.snapshot();

        let mut response = match short_circuit {
            Some(response) => {
                debug!(url = %retained.url, "pre-request hook short-circuited the transport");
                response
            }
            None => transport.call(request).await?,
        };

        for hook in options.hooks.after_response.clone() {
            if let Some(replacement) = hook.call(&retained, &options, &response).await? {
                response = replacement;
            }
        }

        if !response.ok() {
            debug!(url = %retained.url, status = response.status.as_u16(), "response status indicates failure");
            return Err(Error::http(retained, response));
        }

        decode(response, options.response_kind).await
    }
}

async fn decode(response: Response, kind: Option<ResponseKind>) -> Result<Decoded, Error> {
    match kind {
        Some(ResponseKind::Void) => Ok(Decoded::Void),
        Some(ResponseKind::Raw) | None => Ok(Decoded::Raw(response)),
        Some(ResponseKind::Json) => {
            // An empty 204/`content-length: 0` body is not valid JSON;
            // yield an empty string instead of a parse error.
            if response.status == StatusCode::NO_CONTENT
                || response.headers.first("content-length") == Some("0")
            {
                return Ok(Decoded::Json(Value::String(String::new())));
            }

            Ok(Decoded::Json(response.json().await?))
        }
        Some(ResponseKind::Text) => Ok(Decoded::Text(response.text().await?)),
        Some(ResponseKind::Bytes) => Ok(Decoded::Bytes(response.bytes().await?)),
        Some(ResponseKind::Form) => Ok(Decoded::Form(response.form().await?)),
    }
}
