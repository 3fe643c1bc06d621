use crate::error::Error;
use crate::request::{Request, RequestOptions};
use crate::response::Response;
use crate::transport::BoxFuture;

use std::sync::Arc;

use async_trait::async_trait;

/// The outcome of a pre-request hook.
pub enum Intercept {
    /// Continue to the next hook, request unchanged.
    Continue,

    /// Replace the current request and stop iterating the remaining
    /// pre-request hooks.
    Replace(Request),

    /// Short-circuit with this response, skipping the transport call.
    Respond(Response),
}

/// A hook invoked before the transport call.
///
/// Hooks communicate changes only through their return value; the request
/// they observe must not be mutated behind the pipeline's back.
#[async_trait]
pub trait BeforeRequest: Send + Sync {
    async fn call(
        &self,
        request: &Request,
        options: &RequestOptions,
    ) -> Result<Intercept, Error>;
}

/// A hook invoked after a response was obtained.
///
/// Returning `Some` replaces the response for all subsequent hooks and the
/// final classification. Every post-response hook runs, regardless of
/// prior replacements.
#[async_trait]
pub trait AfterResponse: Send + Sync {
    async fn call(
        &self,
        request: &Request,
        options: &RequestOptions,
        response: &Response,
    ) -> Result<Option<Response>, Error>;
}

/// The two-stage hook chain of a dispatch.
///
/// Hooks of a phase run strictly sequentially in list order.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_request: Vec<Arc<dyn BeforeRequest>>,
    pub after_response: Vec<Arc<dyn AfterResponse>>,
}

impl Hooks {
    pub fn new() -> Hooks {
        Hooks::default()
    }

    /// Prepend every hook of `source` before this chain's own hooks,
    /// per phase.
    pub fn merge(&mut self, source: &Hooks) {
        self.before_request
            .splice(0..0, source.before_request.iter().cloned());
        self.after_response
            .splice(0..0, source.after_response.iter().cloned());
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_request", &self.before_request.len())
            .field("after_response", &self.after_response.len())
            .finish()
    }
}

/// Create a pre-request hook from a closure.
pub fn before_fn<F>(f: F) -> Arc<dyn BeforeRequest>
where
    F: for<'a> Fn(&'a Request, &'a RequestOptions) -> BoxFuture<'a, Result<Intercept, Error>>
        + Send
        + Sync
        + 'static,
{
    struct Impl<F>(F);

    #[async_trait]
    impl<F> BeforeRequest for Impl<F>
    where
        F: for<'a> Fn(&'a Request, &'a RequestOptions) -> BoxFuture<'a, Result<Intercept, Error>>
            + Send
            + Sync
            + 'static,
    {
        async fn call(
            &self,
            request: &Request,
            options: &RequestOptions,
        ) -> Result<Intercept, Error> {
            (self.0)(request, options).await
        }
    }

    Arc::new(Impl(f))
}

/// Create a post-response hook from a closure.
pub fn after_fn<F>(f: F) -> Arc<dyn AfterResponse>
where
    F: for<'a> Fn(
            &'a Request,
            &'a RequestOptions,
            &'a Response,
        ) -> BoxFuture<'a, Result<Option<Response>, Error>>
        + Send
        + Sync
        + 'static,
{
    struct Impl<F>(F);

    #[async_trait]
    impl<F> AfterResponse for Impl<F>
    where
        F: for<'a> Fn(
                &'a Request,
                &'a RequestOptions,
                &'a Response,
            ) -> BoxFuture<'a, Result<Option<Response>, Error>>
            + Send
            + Sync
            + 'static,
    {
        async fn call(
            &self,
            request: &Request,
            options: &RequestOptions,
            response: &Response,
        ) -> Result<Option<Response>, Error> {
            (self.0)(request, options, response).await
        }
    }

    Arc::new(Impl(f))
}
