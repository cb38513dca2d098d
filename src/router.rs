//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A [`Router`] is itself a
//! [`Handler`], so a server-side interceptor stack wraps the whole routing
//! table in one go:
//!
//! ```rust
//! use std::sync::Arc;
//! use hopware::{correlation, handler_fn, BoxedHandler, Interceptor, Request, Router, Stack};
//! use http::Method;
//!
//! let router: BoxedHandler = Arc::new(
//!     Router::new().on(Method::GET, "/users/{id}", handler_fn(|_req: Request| async { "alice" })),
//! );
//!
//! let app: BoxedHandler = Stack::new()
//!     .with(correlation::Inbound::new(Arc::new(correlation::Config::new())))
//!     .wrap(router);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

struct Route {
    template: String,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup. Each [`Router::on`] call returns `self` so
/// registrations chain naturally. Unmatched requests get `404 Not Found`.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them and `req.route()` returns the template.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.route(method, path, Arc::new(handler))
    }

    /// Like [`on`](Self::on), for a handler that is already boxed (for
    /// instance the output of an interceptor stack).
    pub fn route(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        let route = Route { template: path.to_owned(), handler };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Handler for Router {
    fn call(&self, mut req: Request) -> BoxFuture<Response> {
        match self.lookup(req.method(), req.path()) {
            Some((route, params)) => {
                req.params = params;
                req.route = Some(route.template.clone());
                route.handler.call(req)
            }
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::Uri;

    use super::*;
    use crate::handler::handler_fn;

    fn router() -> Router {
        Router::new()
            .on(Method::GET, "/users/{id}", handler_fn(|req: Request| async move {
                format!("{}@{}", req.param("id").unwrap_or("?"), req.route().unwrap_or("?"))
            }))
            .on(Method::DELETE, "/users/{id}", handler_fn(|_req: Request| async {
                StatusCode::NO_CONTENT
            }))
    }

    #[tokio::test]
    async fn dispatches_by_method_and_path() {
        let router = router();

        let res = router.call(Request::get(Uri::from_static("/users/42"))).await;
        assert_eq!(res.body(), b"42@/users/{id}");

        let res = router.call(Request::new(Method::DELETE, Uri::from_static("/users/42"))).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = router();
        let res = router.call(Request::get(Uri::from_static("/nope"))).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = router.call(Request::new(Method::POST, Uri::from_static("/users/42"))).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = router().on(Method::GET, "/users/{name}", handler_fn(|_req: Request| async { "" }));
    }
}
