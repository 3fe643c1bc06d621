use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

/// A boxed future, as returned by [`transport_fn`] closures.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A shared, type-erased transport.
pub type BoxTransport = Arc<dyn Transport>;

/// A shared, type-erased modifier.
pub type BoxModifier = Arc<dyn Modifier>;

/// The function that actually performs the network call.
///
/// Consumed as an injected dependency: the pipeline makes no assumptions
/// about retry safety, and expects the cancellation signal embedded in the
/// request to be honored on a best-effort basis.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, request: Request) -> Result<Response, Error> {
        (**self).call(request).await
    }
}

/// Wraps a transport to add behavior without changing its signature.
pub trait Modifier: Send + Sync {
    fn wrap(&self, inner: BoxTransport) -> BoxTransport;
}

impl<F> Modifier for F
where
    F: Fn(BoxTransport) -> BoxTransport + Send + Sync,
{
    fn wrap(&self, inner: BoxTransport) -> BoxTransport {
        self(inner)
    }
}

/// Fold a modifier list into one effective transport.
///
/// The first modifier in the list is the outermost wrapper: it sees the
/// call first and the result last.
pub(crate) fn compose(transport: BoxTransport, modifiers: &[BoxModifier]) -> BoxTransport {
    modifiers
        .iter()
        .rev()
        .fold(transport, |inner, modifier| modifier.wrap(inner))
}

/// A transport backed by a closure returning a boxed future.
pub struct TransportFn<F> {
    f: F,
}

/// Create a transport from a closure.
pub fn transport_fn<F>(f: F) -> TransportFn<F>
where
    F: Fn(Request) -> BoxFuture<'static, Result<Response, Error>> + Send + Sync,
{
    TransportFn { f }
}

#[async_trait]
impl<F> Transport for TransportFn<F>
where
    F: Fn(Request) -> BoxFuture<'static, Result<Response, Error>> + Send + Sync,
{
    async fn call(&self, request: Request) -> Result<Response, Error> {
        (self.f)(request).await
    }
}
