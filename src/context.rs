//! Request-scoped key/value store.
//!
//! A [`Context`] travels inside every [`Request`](crate::Request) and is the
//! in-process side channel between interceptors: a server-side interceptor can
//! stash a value that a client-side interceptor, invoked later from the same
//! handler, reads back without parsing headers.
//!
//! Contexts are never mutated. [`Context::with_value`] returns a derived child
//! and leaves the parent untouched, so every clone handed out earlier keeps
//! seeing exactly what it saw before.

use std::collections::HashMap;
use std::sync::Arc;

/// Immutable, cheaply clonable string map attached to a request.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: Arc<HashMap<String, String>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Derives a child context with `key` set to `value`.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::clone(&self.values);
        values.insert(key.into(), value.into());
        Self { values: Arc::new(values) }
    }

    /// `true` when both handles point at the same context instance, i.e. one
    /// is a clone of the other and no child was derived in between.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.values, &b.values)
    }
}
