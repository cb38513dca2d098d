//! Minimal hopware example: a served endpoint that calls a downstream service.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/orders/42
//!   curl -i -H 'correlation-id: from-curl' http://localhost:3000/orders/42
//!
//! Both the response header and the "downstream" log line carry the same id.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode, Uri};
use tracing::info;

use hopware::correlation::{self, Inbound, Outbound};
use hopware::metrics::{self, Metrics, Recorder};
use hopware::{
    BoxedHandler, BoxedSender, Context, Interceptor, Request, Response, Router, Sender, Server,
    Stack, handler_fn, sender_fn,
};

/// Prints every observation instead of exporting it.
struct LogRecorder;

impl Recorder for LogRecorder {
    fn add_inflight_requests(&self, _ctx: &Context, handler: &str, delta: i64) {
        info!(handler, delta, "inflight");
    }

    fn observe_http_request_duration(
        &self,
        ctx: &Context,
        handler: &str,
        duration: Duration,
        method: &str,
        status: &str,
    ) {
        let id = ctx.value(correlation::DEFAULT_HEADER_NAME).unwrap_or("-");
        info!(handler, method, status, ?duration, correlation_id = id, "request duration");
    }

    fn observe_http_response_size(
        &self,
        _ctx: &Context,
        handler: &str,
        size: u64,
        method: &str,
        status: &str,
    ) {
        info!(handler, method, status, size, "response size");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let ids = Arc::new(correlation::Config::new());
    let observed = Arc::new(
        metrics::Config::new(LogRecorder)
            .with_identifier_provider(|req: &Request| req.uri().host().unwrap_or("unknown").to_owned()),
    );

    // Stand-in for a real HTTP client.
    let transport: BoxedSender = Arc::new(sender_fn(|req: Request| async move {
        info!(uri = %req.uri(), id = ?req.header(correlation::DEFAULT_HEADER_NAME), "downstream");
        Ok(Response::json(br#"{"charged":true}"#.to_vec()))
    }));
    let billing: BoxedSender = Stack::new()
        .with(Metrics::new(observed))
        .with(Outbound::new(Arc::clone(&ids)))
        .wrap(transport);

    let router: BoxedHandler = Arc::new(Router::new().on(
        Method::GET,
        "/orders/{id}",
        handler_fn(move |req: Request| {
            let billing = Arc::clone(&billing);
            async move { get_order(req, billing).await }
        }),
    ));

    let app = Stack::new().with(Inbound::new(ids)).wrap(router);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /orders/{id}
//
// Passing the request context along is all it takes for the downstream call
// to reuse this request's correlation id.
async fn get_order(req: Request, billing: BoxedSender) -> Response {
    let id = req.param("id").unwrap_or("unknown").to_owned();

    let charge = Request::new(Method::POST, Uri::from_static("http://billing/charge"))
        .with_context(req.context().clone());

    match billing.send(charge).await {
        Ok(_) => Response::json(format!(r#"{{"id":"{id}","status":"paid"}}"#).into_bytes()),
        Err(_) => Response::status(StatusCode::BAD_GATEWAY),
    }
}
