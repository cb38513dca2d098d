//! HTTP request type shared by handlers and senders.

use std::collections::HashMap;

use http::{Method, Uri};

use crate::context::Context;

/// An HTTP request travelling through an interceptor chain.
///
/// The same type is used on both sides: a [`Server`](crate::Server) builds
/// one from the wire for its handler chain, and client code builds one to
/// hand to a [`Sender`](crate::Sender) chain.
///
/// Headers are an ordered multimap of `(name, value)` pairs. A request built
/// without headers simply has an empty list; lookups on it return `None`.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) route: Option<String>,
    pub(crate) context: Context,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
            route: None,
            context: Context::new(),
        }
    }

    /// Shorthand for a `GET` to `uri`.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn context(&self) -> &Context { &self.context }

    /// Case-insensitive header lookup. Returns the first value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends a value, keeping any existing ones.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Replaces every value of `name` with `value`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.add_header(name, value);
    }

    /// Builder-style [`add_header`](Self::add_header).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the attached context, returning the derived request.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The route template that matched this request (`/users/{id}`), if it
    /// was dispatched through a [`Router`](crate::Router).
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }
}
