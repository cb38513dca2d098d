//! Interceptor trait and ordered composition.
//!
//! An interceptor takes the next stage of a chain and returns a new stage
//! that wraps it. The same trait serves both sides of a call:
//!
//! - `Interceptor<BoxedHandler>` wraps server-side handlers,
//! - `Interceptor<BoxedSender>` wraps client-side senders.
//!
//! A [`Stack`] folds an ordered list of interceptors into one. The first one
//! pushed is the outermost: it sees the request first and the result last.
//!
//! ```text
//! Stack::new().with(a).with(b).wrap(inner)   ==   a.wrap(b.wrap(inner))
//!
//!   request ──► a ──► b ──► inner
//!   result  ◄── a ◄── b ◄──
//! ```
//!
//! Order is significant. With metrics outside correlation, the measured
//! duration includes id assignment; with metrics inside, it does not.

use std::sync::Arc;

/// Wraps the next stage of a chain.
pub trait Interceptor<S>: Send + Sync + 'static {
    fn wrap(&self, next: S) -> S;
}

/// Any `Fn(S) -> S` closure is an interceptor.
impl<S, F> Interceptor<S> for F
where
    F: Fn(S) -> S + Send + Sync + 'static,
{
    fn wrap(&self, next: S) -> S {
        self(next)
    }
}

/// An ordered, outermost-first list of interceptors.
pub struct Stack<S> {
    layers: Vec<Arc<dyn Interceptor<S>>>,
}

impl<S: 'static> Stack<S> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends an interceptor inside every one already pushed.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor<S>) -> Self {
        self.layers.push(Arc::new(interceptor));
        self
    }

    /// Appends a shared interceptor.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor<S>>) -> Self {
        self.layers.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<S: 'static> Interceptor<S> for Stack<S> {
    fn wrap(&self, next: S) -> S {
        self.layers.iter().rev().fold(next, |inner, layer| layer.wrap(inner))
    }
}

impl<S: 'static> Default for Stack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Stack<S> {
    fn clone(&self) -> Self {
        Self { layers: self.layers.clone() }
    }
}
