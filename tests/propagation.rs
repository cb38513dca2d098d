//! End-to-end chains: a served handler that calls downstream through a
//! client chain, with correlation and metrics on both sides.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{Method, StatusCode, Uri};

use hopware::correlation::{self, DEFAULT_HEADER_NAME, Inbound, Outbound};
use hopware::metrics::{self, Metrics, Recorder};
use hopware::{
    BoxedHandler, BoxedSender, Context, Error, Handler, Interceptor, Request, Response, Router,
    Sender, Stack, handler_fn, sender_fn,
};

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Inflight(String, i64),
    Duration(String, String, String),
    Size(String, u64, String, String),
}

#[derive(Default)]
struct Events(Mutex<Vec<Event>>);

impl Events {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Recorder for Events {
    fn add_inflight_requests(&self, _ctx: &Context, handler: &str, delta: i64) {
        self.0.lock().unwrap().push(Event::Inflight(handler.into(), delta));
    }

    fn observe_http_request_duration(
        &self,
        _ctx: &Context,
        handler: &str,
        _duration: Duration,
        method: &str,
        status: &str,
    ) {
        self.0.lock().unwrap().push(Event::Duration(handler.into(), method.into(), status.into()));
    }

    fn observe_http_response_size(
        &self,
        _ctx: &Context,
        handler: &str,
        size: u64,
        method: &str,
        status: &str,
    ) {
        self.0.lock().unwrap().push(Event::Size(handler.into(), size, method.into(), status.into()));
    }
}

fn counting(id: &'static str) -> (correlation::Config, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = correlation::Config::new().with_generator(move |_: &Request| {
        counter.fetch_add(1, Ordering::SeqCst);
        id.to_owned()
    });
    (config, calls)
}

/// Transport stub that records every request it is asked to send.
fn upstream() -> (BoxedSender, Arc<Mutex<Vec<Request>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&sent);
    let sender = sender_fn(move |req: Request| {
        log.lock().unwrap().push(req);
        async { Ok(Response::builder().header("content-length", "30").no_body()) }
    });
    (Arc::new(sender), sent)
}

// ── Correlation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn generated_id_reaches_downstream_and_response() {
    let (config, calls) = counting("abc123");
    let config = Arc::new(config);
    let (transport, sent) = upstream();

    let client = Outbound::new(Arc::clone(&config)).wrap(transport);
    let router: BoxedHandler = Arc::new(Router::new().on(
        Method::GET,
        "/orders/{id}",
        handler_fn(move |req: Request| {
            let client = Arc::clone(&client);
            async move {
                let downstream = Request::get(Uri::from_static("http://billing/charge"))
                    .with_context(req.context().clone());
                client.send(downstream).await.unwrap_or_else(|_| Response::status(StatusCode::BAD_GATEWAY))
            }
        }),
    ));
    let app = Stack::new().with(Inbound::new(config)).wrap(router);

    let res = app.call(Request::get(Uri::from_static("/orders/7"))).await;

    let sent = sent.lock().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header(DEFAULT_HEADER_NAME), Some("abc123"));
    assert_eq!(res.header(DEFAULT_HEADER_NAME), Some("abc123"));
}

#[tokio::test]
async fn caller_supplied_id_is_forwarded_verbatim() {
    let (config, calls) = counting("never");
    let config = Arc::new(config);
    let (transport, sent) = upstream();

    let client = Outbound::new(Arc::clone(&config)).wrap(transport);
    let inner: BoxedHandler = Arc::new(handler_fn(move |req: Request| {
        let client = Arc::clone(&client);
        async move {
            let downstream = Request::get(Uri::from_static("http://billing/charge"))
                .with_context(req.context().clone());
            client.send(downstream).await.unwrap()
        }
    }));
    let app = Inbound::new(config).wrap(inner);

    let req = Request::get(Uri::from_static("/")).with_header(DEFAULT_HEADER_NAME, "Upstream-ID 42");
    let res = app.call(req).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(sent.lock().unwrap()[0].header(DEFAULT_HEADER_NAME), Some("Upstream-ID 42"));
    assert_eq!(res.header(DEFAULT_HEADER_NAME), Some("Upstream-ID 42"));
}

#[tokio::test]
async fn outbound_prefers_context_over_generation() {
    let (config, calls) = counting("minted");
    let (transport, sent) = upstream();
    let client = Outbound::new(Arc::new(config)).wrap(transport);

    let ctx = Context::new().with_value(DEFAULT_HEADER_NAME, "xyz");
    client
        .send(Request::get(Uri::from_static("http://svc/")).with_context(ctx.clone()))
        .await
        .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(sent[0].header(DEFAULT_HEADER_NAME), Some("xyz"));
    assert!(Context::ptr_eq(sent[0].context(), &ctx));
}

#[tokio::test]
async fn every_hop_of_one_request_shares_the_id() {
    let (config, calls) = counting("shared");
    let config = Arc::new(config);
    let (transport, sent) = upstream();

    let client = Outbound::new(Arc::clone(&config)).wrap(transport);
    let inner: BoxedHandler = Arc::new(handler_fn(move |req: Request| {
        let client = Arc::clone(&client);
        async move {
            for target in ["http://a/", "http://b/", "http://c/"] {
                let downstream = Request::get(Uri::from_static(target))
                    .with_context(req.context().clone());
                client.send(downstream).await.unwrap();
            }
            Response::text("done")
        }
    }));
    Inbound::new(config).wrap(inner).call(Request::get(Uri::from_static("/"))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|r| r.header(DEFAULT_HEADER_NAME) == Some("shared")));
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_send_is_observed_as_unavailable() {
    let events = Arc::new(Events::default());
    let config = metrics::Config::new(Arc::clone(&events))
        .with_identifier_provider(|_: &Request| "billing".to_owned())
        .with_split_status(true);

    let transport: BoxedSender = Arc::new(sender_fn(|_req: Request| async {
        Err(Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")))
    }));
    let client = Metrics::new(Arc::new(config)).wrap(transport);

    let err = client.send(Request::get(Uri::from_static("http://billing/"))).await.unwrap_err();

    assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::ConnectionReset));
    assert_eq!(
        events.take(),
        [
            Event::Inflight("billing".into(), 1),
            Event::Duration("billing".into(), "GET".into(), "503".into()),
            Event::Size("billing".into(), 0, "GET".into(), "503".into()),
            Event::Inflight("billing".into(), -1),
        ],
    );
}

#[tokio::test]
async fn stack_order_decides_what_metrics_see() {
    let events = Arc::new(Events::default());
    let metrics_config = Arc::new(
        metrics::Config::new(Arc::clone(&events))
            .with_identifier_provider(|req: &Request| {
                req.header(DEFAULT_HEADER_NAME).unwrap_or("none").to_owned()
            })
            .with_measure_inflight(false)
            .with_measure_size(false),
    );
    let ids = Arc::new(correlation::Config::new().with_generator(|_: &Request| "id-1".to_owned()));

    // Metrics outside correlation: the id is not assigned yet when metrics run.
    let (transport, _) = upstream();
    let outer = Stack::new()
        .with(Metrics::new(Arc::clone(&metrics_config)))
        .with(Outbound::new(Arc::clone(&ids)))
        .wrap(transport);
    outer.send(Request::get(Uri::from_static("http://svc/"))).await.unwrap();

    // Metrics inside correlation: they observe the assigned id.
    let (transport, _) = upstream();
    let inner = Stack::new()
        .with(Outbound::new(ids))
        .with(Metrics::new(metrics_config))
        .wrap(transport);
    inner.send(Request::get(Uri::from_static("http://svc/"))).await.unwrap();

    assert_eq!(
        events.take(),
        [
            Event::Duration("none".into(), "GET".into(), "200xx".into()),
            Event::Duration("id-1".into(), "GET".into(), "200xx".into()),
        ],
    );
}

#[tokio::test]
async fn server_side_metrics_use_route_template() {
    let events = Arc::new(Events::default());
    let config = Arc::new(metrics::Config::new(Arc::clone(&events)));

    let router: BoxedHandler = Arc::new(
        Router::new().on(Method::GET, "/users/{id}", handler_fn(|_req: Request| async { "alice" })),
    );
    // Metrics inside the router's dispatch see the matched template.
    let routed: BoxedHandler = Arc::new(Router::new().route(
        Method::GET,
        "/users/{id}",
        Metrics::new(config).wrap(router),
    ));

    let res = routed.call(Request::get(Uri::from_static("/users/42"))).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(
        events.take(),
        [
            Event::Inflight("/users/{id}".into(), 1),
            Event::Duration("/users/{id}".into(), "GET".into(), "200xx".into()),
            Event::Size("/users/{id}".into(), 5, "GET".into(), "200xx".into()),
            Event::Inflight("/users/{id}".into(), -1),
        ],
    );
}
