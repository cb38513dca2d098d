//! Client-side call capability.
//!
//! A [`Sender`] is the mirror image of a [`Handler`](crate::Handler): it takes
//! an outgoing request and eventually yields the remote response, or an
//! [`Error`] when none was produced. The real transport sits at the bottom of
//! a sender chain; client-side interceptors wrap it.

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Sends a request and yields the response or a transport error.
pub trait Sender: Send + Sync + 'static {
    fn send(&self, req: Request) -> BoxFuture<Result<Response, Error>>;
}

/// A type-erased sender shared across concurrent requests.
pub type BoxedSender = Arc<dyn Sender>;

/// Turns an `async fn(Request) -> Result<Response, Error>` into a [`Sender`].
///
/// Useful for adapting an HTTP client, or for stubbing the transport in tests:
///
/// ```rust
/// use hopware::{sender_fn, Request, Response};
///
/// let transport = sender_fn(|_req: Request| async { Ok(Response::text("pong")) });
/// ```
pub fn sender_fn<F, Fut>(f: F) -> FnSender<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    FnSender(f)
}

/// Newtype returned by [`sender_fn`].
#[derive(Clone, Copy)]
pub struct FnSender<F>(F);

impl<F, Fut> Sender for FnSender<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn send(&self, req: Request) -> BoxFuture<Result<Response, Error>> {
        Box::pin((self.0)(req))
    }
}
