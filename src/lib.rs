//! # hopware
//!
//! Composable HTTP interceptors for both ends of a call.
//!
//! An interceptor wraps the next stage of a call path and hands back a new
//! stage. Server-side stages are [`Handler`]s, client-side stages are
//! [`Sender`]s. Neither side knows how many interceptors sit around it, so
//! concerns such as request correlation and metrics attach without touching
//! call sites.
//!
//! ## What ships
//!
//! - [`Stack`]: folds interceptors into one, first pushed is outermost
//! - [`correlation`]: correlation-id assignment and propagation,
//!   [`Inbound`](correlation::Inbound) for handlers and
//!   [`Outbound`](correlation::Outbound) for senders
//! - [`metrics`]: inflight, duration and response-size observations handed to
//!   a pluggable [`Recorder`](metrics::Recorder)
//! - [`Router`] and [`Server`]: enough plumbing to serve a handler chain
//!
//! What this crate does not do: TLS, connection pooling, retries, storing or
//! exporting metrics. Those belong to the transport and to the `metrics`
//! exporter the process installs.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hopware::{correlation, metrics, sender_fn, BoxedHandler, BoxedSender, Interceptor, Request,
//!               Response, Router, Server, Stack, handler_fn};
//! use http::{Method, Uri};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ids = Arc::new(correlation::Config::new());
//!     let observed = Arc::new(metrics::Config::new(metrics::MetricsRecorder::new()));
//!
//!     // Client chain: metrics outermost, so the timer includes id assignment.
//!     let transport: BoxedSender = Arc::new(sender_fn(|_req: Request| async {
//!         Ok(Response::text("pong"))
//!     }));
//!     let client: BoxedSender = Stack::new()
//!         .with(metrics::Metrics::new(observed))
//!         .with(correlation::Outbound::new(Arc::clone(&ids)))
//!         .wrap(transport);
//!
//!     let router: BoxedHandler = Arc::new(Router::new().on(Method::GET, "/ping", handler_fn(move |req: Request| {
//!         let client = Arc::clone(&client);
//!         async move {
//!             // Same context, same correlation id downstream.
//!             let downstream = Request::get(Uri::from_static("http://upstream/ping"))
//!                 .with_context(req.context().clone());
//!             match client.send(downstream).await {
//!                 Ok(res) => res,
//!                 Err(_) => Response::status(http::StatusCode::BAD_GATEWAY),
//!             }
//!         }
//!     })));
//!
//!     let app: BoxedHandler = Stack::new()
//!         .with(correlation::Inbound::new(ids))
//!         .wrap(router);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```

mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod sender;
mod server;
mod stack;

pub mod correlation;
pub mod metrics;

pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, BoxedHandler, FnHandler, Handler, handler_fn};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use sender::{BoxedSender, FnSender, Sender, sender_fn};
pub use server::Server;
pub use stack::{Interceptor, Stack};
