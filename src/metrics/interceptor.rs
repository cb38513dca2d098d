//! The metrics interceptor and its per-call guard.

use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use tracing::debug;

use super::{Config, NO_RESPONSE_STATUS};
use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::sender::{BoxedSender, Sender};
use crate::stack::Interceptor;

/// Times calls and reports them to the configured [`Recorder`](super::Recorder).
///
/// Wraps senders (client side) and handlers (server side) alike. It never
/// alters the request, the response or the error it observes.
#[derive(Clone, Debug)]
pub struct Metrics {
    config: Arc<Config>,
}

impl Metrics {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Interceptor<BoxedSender> for Metrics {
    fn wrap(&self, next: BoxedSender) -> BoxedSender {
        Arc::new(MetricsSender { config: Arc::clone(&self.config), next })
    }
}

impl Interceptor<BoxedHandler> for Metrics {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(MetricsHandler { config: Arc::clone(&self.config), next })
    }
}

struct MetricsSender {
    config: Arc<Config>,
    next: BoxedSender,
}

impl Sender for MetricsSender {
    fn send(&self, req: Request) -> BoxFuture<Result<Response, Error>> {
        let call = CallGuard::start(&self.config, &req);
        let fut = self.next.send(req);
        Box::pin(async move {
            let result = fut.await;
            call.finish(result.as_ref().ok());
            result
        })
    }
}

struct MetricsHandler {
    config: Arc<Config>,
    next: BoxedHandler,
}

impl Handler for MetricsHandler {
    fn call(&self, req: Request) -> BoxFuture<Response> {
        let call = CallGuard::start(&self.config, &req);
        let fut = self.next.call(req);
        Box::pin(async move {
            let res = fut.await;
            call.finish(Some(&res));
            res
        })
    }
}

// ── Per-call guard ────────────────────────────────────────────────────────────

/// Holds one inflight slot and the call's start time.
///
/// [`finish`](CallGuard::finish) records the outcome. If the guard is dropped
/// without finishing (panic, or the future was dropped mid-flight), the call
/// is recorded as having produced no response. The inflight decrement happens
/// on drop in both cases.
struct CallGuard {
    config: Arc<Config>,
    ctx: Context,
    handler: String,
    method: Method,
    start: Instant,
    finished: bool,
}

impl CallGuard {
    fn start(config: &Arc<Config>, req: &Request) -> Self {
        let handler = (config.identifier_provider)(req);
        let ctx = req.context().clone();
        if config.measure_inflight {
            config.recorder.add_inflight_requests(&ctx, &handler, 1);
        }
        Self {
            config: Arc::clone(config),
            ctx,
            handler,
            method: req.method().clone(),
            start: Instant::now(),
            finished: false,
        }
    }

    fn finish(mut self, res: Option<&Response>) {
        match res {
            Some(res) => self.observe(res.status_code(), res.content_length()),
            None => self.observe(NO_RESPONSE_STATUS, 0),
        }
        self.finished = true;
    }

    fn observe(&self, status: StatusCode, size: u64) {
        let elapsed = self.start.elapsed();
        let label = self.config.status_label(status);
        let recorder = &self.config.recorder;

        recorder.observe_http_request_duration(
            &self.ctx,
            &self.handler,
            elapsed,
            self.method.as_str(),
            &label,
        );
        if self.config.measure_size {
            recorder.observe_http_response_size(
                &self.ctx,
                &self.handler,
                size,
                self.method.as_str(),
                &label,
            );
        }
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        if !self.finished {
            debug!(handler = %self.handler, "call ended without a response");
            self.observe(NO_RESPONSE_STATUS, 0);
        }
        if self.config.measure_inflight {
            self.config.recorder.add_inflight_requests(&self.ctx, &self.handler, -1);
        }
    }
}
