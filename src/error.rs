//! Unified error type.

/// Boxed error from an arbitrary transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by a [`Sender`](crate::Sender) and by the server.
///
/// Application-level failures (404, 422, ...) are [`Response`](crate::Response)
/// values, not `Error`s. This type covers the cases where no response exists:
/// the transport failed, timed out, or the listener could not be bound.
/// Interceptors forward it untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out")]
    Timeout,

    #[error("transport: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Wraps any transport error.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}
