use crate::error::{BoxError, Error};

use std::fmt;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;

type BoxStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync>>;

/// Represents the body of an HTTP message.
///
/// A body is consumed at most once; reading a body that was already
/// taken fails with [`Error::BodyConsumed`].
pub struct Body {
    kind: BodyKind,
}

enum BodyKind {
    Stream(BoxStream),
    Once(Bytes),
    Empty,
    Taken,
}

impl Body {
    /// Create a `Body` from a stream of bytes.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        struct MapErr<S>(S);

        impl<S, E> Stream for MapErr<S>
        where
            S: Stream<Item = Result<Bytes, E>> + Unpin,
            E: std::error::Error + Send + Sync + 'static,
        {
            type Item = Result<Bytes, BoxError>;

            fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
                Pin::new(&mut self.0)
                    .poll_next(cx)
                    .map_err(|err| Box::new(err) as _)
            }
        }

        Body {
            kind: BodyKind::Stream(Box::pin(MapErr(Box::pin(stream)))),
        }
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Body {
            kind: BodyKind::Once(bytes.into()),
        }
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Body {
            kind: BodyKind::Empty,
        }
    }

    /// Whether this body is known to hold no bytes.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            BodyKind::Once(ref bytes) => bytes.is_empty(),
            BodyKind::Empty | BodyKind::Taken => true,
            BodyKind::Stream(_) => false,
        }
    }

    /// Clone this body, unless it is backed by a stream.
    pub fn try_clone(&self) -> Option<Body> {
        let kind = match self.kind {
            BodyKind::Stream(_) => return None,
            BodyKind::Once(ref bytes) => BodyKind::Once(bytes.clone()),
            BodyKind::Empty => BodyKind::Empty,
            BodyKind::Taken => BodyKind::Taken,
        };

        Some(Body { kind })
    }

    /// Take the body out, leaving a marker behind.
    ///
    /// Returns `None` if the body was taken before.
    pub fn take(&mut self) -> Option<Body> {
        match std::mem::replace(&mut self.kind, BodyKind::Taken) {
            BodyKind::Taken => None,
            kind => Some(Body { kind }),
        }
    }

    /// Read the body to completion.
    pub async fn into_bytes(self) -> Result<Bytes, Error> {
        match self.kind {
            BodyKind::Once(bytes) => Ok(bytes),
            BodyKind::Empty => Ok(Bytes::new()),
            BodyKind::Taken => Err(Error::BodyConsumed),
            BodyKind::Stream(mut stream) => {
                let mut buf = BytesMut::new();

                while let Some(chunk) = poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
                    buf.extend_from_slice(&chunk.map_err(Error::Transport)?);
                }

                Ok(buf.freeze())
            }
        }
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.kind {
            BodyKind::Stream(ref mut stream) => stream.as_mut().poll_next(cx),
            BodyKind::Once(ref mut bytes) => {
                let bytes = std::mem::take(bytes);
                this.kind = BodyKind::Empty;
                Poll::Ready(Some(Ok(bytes)))
            }
            BodyKind::Empty | BodyKind::Taken => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.kind {
            BodyKind::Stream(ref stream) => stream.size_hint(),
            BodyKind::Once(ref bytes) => (bytes.len(), Some(bytes.len())),
            BodyKind::Empty | BodyKind::Taken => (0, Some(0)),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::once(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::once(bytes)
    }
}

impl From<String> for Body {
    fn from(string: String) -> Self {
        Body::once(string)
    }
}

impl From<&'static str> for Body {
    fn from(str: &'static str) -> Self {
        Body::once(str)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BodyKind::Stream(_) => "Stream",
            BodyKind::Once(_) => "Once",
            BodyKind::Empty => "Empty",
            BodyKind::Taken => "Taken",
        };

        f.debug_struct("Body").field("kind", &kind).finish()
    }
}
