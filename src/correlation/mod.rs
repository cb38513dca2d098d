//! Correlation-id propagation.
//!
//! One id per logical request, carried in a single configurable header
//! (`Correlation-Id` by default) and mirrored into the request [`Context`]
//! under the same key.
//!
//! - [`Inbound`] wraps a server [`Handler`](crate::Handler): it adopts the
//!   caller's id or mints one, exposes it in the request context, and echoes it
//!   on the response.
//! - [`Outbound`] wraps a client [`Sender`](crate::Sender): it reuses the id a
//!   server-side [`Inbound`] already put in the context, falls back to a header
//!   set by hand, and only then mints one.
//!
//! Placing `Inbound` on the server and `Outbound` on the clients the handler
//! calls gives every downstream hop the id of the request that caused it.
//!
//! ```rust
//! use std::sync::Arc;
//! use hopware::correlation::{self, Inbound, Outbound};
//!
//! let config = Arc::new(
//!     correlation::Config::new()
//!         .with_header_name("x-request-id")
//!         .with_generator(|_: &hopware::Request| "fixed-id".to_owned()),
//! );
//! let server_side = Inbound::new(Arc::clone(&config));
//! let client_side = Outbound::new(config);
//! ```
//!
//! [`Context`]: crate::Context

mod generator;
mod inbound;
mod outbound;

use std::fmt;
use std::sync::Arc;

pub use generator::{DEFAULT_ID_LEN, IdGenerator, RandomIdGenerator};
pub use inbound::Inbound;
pub use outbound::Outbound;

/// Header, and context key, used when none is configured.
pub const DEFAULT_HEADER_NAME: &str = "Correlation-Id";

/// Shared configuration for [`Inbound`] and [`Outbound`].
///
/// Build it once, wrap it in an `Arc`, and hand clones to every interceptor.
/// Fields are public so integrators can override them before construction.
#[derive(Clone)]
pub struct Config {
    pub header_name: String,
    pub id_generator: Arc<dyn IdGenerator>,
}

impl Config {
    /// Default header name and an entropy-seeded [`RandomIdGenerator`].
    pub fn new() -> Self {
        Self {
            header_name: DEFAULT_HEADER_NAME.to_owned(),
            id_generator: Arc::new(RandomIdGenerator::new()),
        }
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_generator(mut self, generator: impl IdGenerator) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("header_name", &self.header_name)
            .finish_non_exhaustive()
    }
}
