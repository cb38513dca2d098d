//! Request metrics instrumentation.
//!
//! [`Metrics`] times every call that passes through it and hands three kinds
//! of observation to a [`Recorder`]:
//!
//! | Observation | When | Value |
//! |---|---|---|
//! | inflight | before and after the call | `+1` / `-1` |
//! | duration | after the call | wall time of the inner stages |
//! | response size | after the call | declared body length, `0` without response |
//!
//! Each observation is labeled with the handler identifier, the HTTP method and
//! a status label. A call that produced no response (transport error, panic,
//! dropped future) is recorded as `503`.
//!
//! The recorder is the only shared mutable piece and must be safe for
//! concurrent use. [`MetricsRecorder`] forwards to the process-wide `metrics`
//! facade, so whichever exporter is installed receives the data.

mod interceptor;
mod recorder;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;

pub use interceptor::Metrics;
pub use recorder::MetricsRecorder;

use crate::context::Context;
use crate::request::Request;

/// Status recorded when no response was produced.
pub const NO_RESPONSE_STATUS: StatusCode = StatusCode::SERVICE_UNAVAILABLE;

/// Sink for observations. Called on the request path: implementations must
/// not block.
pub trait Recorder: Send + Sync + 'static {
    fn add_inflight_requests(&self, ctx: &Context, handler: &str, delta: i64);

    fn observe_http_request_duration(
        &self,
        ctx: &Context,
        handler: &str,
        duration: Duration,
        method: &str,
        status: &str,
    );

    fn observe_http_response_size(
        &self,
        ctx: &Context,
        handler: &str,
        size: u64,
        method: &str,
        status: &str,
    );
}

impl<R: Recorder + ?Sized> Recorder for Arc<R> {
    fn add_inflight_requests(&self, ctx: &Context, handler: &str, delta: i64) {
        (**self).add_inflight_requests(ctx, handler, delta);
    }

    fn observe_http_request_duration(
        &self,
        ctx: &Context,
        handler: &str,
        duration: Duration,
        method: &str,
        status: &str,
    ) {
        (**self).observe_http_request_duration(ctx, handler, duration, method, status);
    }

    fn observe_http_response_size(
        &self,
        ctx: &Context,
        handler: &str,
        size: u64,
        method: &str,
        status: &str,
    ) {
        (**self).observe_http_response_size(ctx, handler, size, method, status);
    }
}

/// Derives the handler identifier label from a request.
///
/// The returned value becomes a metric label: keep its range small (a route
/// template, not a raw URL).
pub type IdentifierProvider = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// Shared configuration for [`Metrics`].
///
/// `measure_inflight` and `measure_size` default to `true`, `split_status`
/// to `false`.
#[derive(Clone)]
pub struct Config {
    pub identifier_provider: IdentifierProvider,
    pub recorder: Arc<dyn Recorder>,
    /// Label with the exact status code instead of its hundreds class.
    pub split_status: bool,
    pub measure_inflight: bool,
    pub measure_size: bool,
}

impl Config {
    /// Identifies handlers by matched route template, falling back to the
    /// request path.
    pub fn new(recorder: impl Recorder) -> Self {
        Self {
            identifier_provider: Arc::new(default_identifier),
            recorder: Arc::new(recorder),
            split_status: false,
            measure_inflight: true,
            measure_size: true,
        }
    }

    pub fn with_identifier_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        self.identifier_provider = Arc::new(provider);
        self
    }

    pub fn with_split_status(mut self, split: bool) -> Self {
        self.split_status = split;
        self
    }

    pub fn with_measure_inflight(mut self, enabled: bool) -> Self {
        self.measure_inflight = enabled;
        self
    }

    pub fn with_measure_size(mut self, enabled: bool) -> Self {
        self.measure_size = enabled;
        self
    }

    /// Label for `status` under this config.
    pub fn status_label(&self, status: StatusCode) -> String {
        status_label(status, self.split_status)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("split_status", &self.split_status)
            .field("measure_inflight", &self.measure_inflight)
            .field("measure_size", &self.measure_size)
            .finish_non_exhaustive()
    }
}

fn default_identifier(req: &Request) -> String {
    req.route().unwrap_or_else(|| req.path()).to_owned()
}

/// `404` → `"404"` when split, `"400xx"` otherwise.
pub fn status_label(status: StatusCode, split: bool) -> String {
    let code = status.as_u16();
    if split {
        code.to_string()
    } else {
        format!("{}xx", code / 100 * 100)
    }
}
