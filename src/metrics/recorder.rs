//! [`Recorder`] backed by the `metrics` facade.

use std::time::Duration;

use super::Recorder;
use crate::context::Context;

/// Inflight gauge name.
pub const INFLIGHT_REQUESTS: &str = "http_inflight_requests";
/// Request duration histogram name, in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
/// Response size histogram name, in bytes.
pub const RESPONSE_SIZE_BYTES: &str = "http_response_size_bytes";

/// Forwards observations to whatever `metrics` exporter the process installed
/// (Prometheus, StatsD, ...). Without an installed exporter every call is a
/// no-op.
///
/// Metric names can be prefixed, e.g. `MetricsRecorder::with_prefix("upstream")`
/// yields `upstream_http_request_duration_seconds`.
#[derive(Clone, Debug, Default)]
pub struct MetricsRecorder {
    prefix: Option<String>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()) }
    }

    fn name(&self, metric: &'static str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{metric}"),
            None => metric.to_owned(),
        }
    }
}

impl Recorder for MetricsRecorder {
    fn add_inflight_requests(&self, _ctx: &Context, handler: &str, delta: i64) {
        ::metrics::gauge!(self.name(INFLIGHT_REQUESTS), "handler" => handler.to_owned())
            .increment(delta as f64);
    }

    fn observe_http_request_duration(
        &self,
        _ctx: &Context,
        handler: &str,
        duration: Duration,
        method: &str,
        status: &str,
    ) {
        ::metrics::histogram!(
            self.name(REQUEST_DURATION_SECONDS),
            "handler" => handler.to_owned(),
            "method" => method.to_owned(),
            "status" => status.to_owned()
        )
        .record(duration.as_secs_f64());
    }

    fn observe_http_response_size(
        &self,
        _ctx: &Context,
        handler: &str,
        size: u64,
        method: &str,
        status: &str,
    ) {
        ::metrics::histogram!(
            self.name(RESPONSE_SIZE_BYTES),
            "handler" => handler.to_owned(),
            "method" => method.to_owned(),
            "status" => status.to_owned()
        )
        .record(size as f64);
    }
}
