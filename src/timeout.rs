use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{BoxTransport, Modifier, Transport};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Modifier that abandons a transport call once a deadline elapses.
///
/// On timeout the call fails with [`Error::Timeout`] carrying the request.
/// By default a cancellation token derived from the request's own token is
/// cancelled as well, so a transport that honors its signal stops holding
/// resources; with [`Timeout::without_cancel`] the underlying call may keep
/// running, but its result is discarded.
#[derive(Debug, Clone)]
pub struct Timeout {
    duration: Duration,
    cancel: bool,
}

impl Timeout {
    /// Timeout after `duration`, cancelling the in-flight call.
    pub fn new(duration: Duration) -> Timeout {
        Timeout {
            duration,
            cancel: true,
        }
    }

    /// Timeout after `duration`, leaving the in-flight call running.
    pub fn without_cancel(duration: Duration) -> Timeout {
        Timeout {
            duration,
            cancel: false,
        }
    }
}

impl Modifier for Timeout {
    fn wrap(&self, inner: BoxTransport) -> BoxTransport {
        Arc::new(TimeoutTransport {
            inner,
            duration: self.duration,
            cancel: self.cancel,
        })
    }
}

struct TimeoutTransport {
    inner: BoxTransport,
    duration: Duration,
    cancel: bool,
}

#[async_trait]
impl Transport for TimeoutTransport {
    async fn call(&self, mut request: Request) -> Result<Response, Error> {
        // Derive a child token so a timeout aborts the in-flight call
        // without cancelling the caller's own token. Aborting the original
        // token still propagates down through the parent link. An already
        // cancelled token does not short-circuit here; honoring it is the
        // inner transport's responsibility.
        let token = self.cancel.then(|| {
            let token = match request.signal {
                Some(ref parent) => parent.child_token(),
                None => CancellationToken::new(),
            };

            request.signal = Some(token.clone());
            token
        });

        let snapshot = request.snapshot();

        // The timer is dropped on both paths, settled or not.
        match tokio::time::timeout(self.duration, self.inner.call(request)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(url = %snapshot.url, timeout_ms = self.duration.as_millis() as u64, "request timed out");

                if let Some(token) = token {
                    token.cancel();
                }

                Err(Error::timeout(snapshot))
            }
        }
    }
}
