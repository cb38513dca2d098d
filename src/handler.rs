//! Server-side call capability and type erasure.
//!
//! # How handlers are stored
//!
//! Interceptors wrap handlers of *different* concrete types and hand back a
//! new handler, so every stage of a chain is kept behind one trait object:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ handler_fn(hello)
//! FnHandler(hello)                                 ← newtype, implements Handler
//!        ↓ Arc::new(..)
//! BoxedHandler = Arc<dyn Handler>                  ← what interceptors wrap
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! The per-request cost is one `Arc` clone plus one virtual call per stage.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` so tokio can move it across worker threads.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Receives a request and always produces a response.
///
/// Implemented by [`Router`](crate::Router), by every server-side
/// interceptor's wrapper, and by [`handler_fn`] for plain async functions.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<Response>;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Turns an `async fn(Request) -> impl IntoResponse` into a [`Handler`].
///
/// ```rust
/// use hopware::{handler_fn, Request};
///
/// let handler = handler_fn(|_req: Request| async { "ok" });
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FnHandler(f)
}

/// Newtype returned by [`handler_fn`], bridging a closure to [`Handler`].
#[derive(Clone, Copy)]
pub struct FnHandler<F>(F);

impl<F, Fut, R> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Response> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use http::{StatusCode, Uri};

    use super::*;

    #[tokio::test]
    async fn handler_fn_converts_return_value() {
        let handler: BoxedHandler = Arc::new(handler_fn(|_req: Request| async {
            StatusCode::ACCEPTED
        }));
        let res = handler.call(Request::get(Uri::from_static("/"))).await;
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }
}
