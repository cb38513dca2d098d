//! Client-side correlation interceptor.

use std::sync::Arc;

use tracing::debug;

use super::Config;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::sender::{BoxedSender, Sender};
use crate::stack::Interceptor;

/// Attaches a correlation id to every outgoing request.
///
/// Resolution order:
///
/// 1. **Context.** When the request context already holds the id (an
///    [`Inbound`](super::Inbound) ran earlier in this logical request), it is
///    added as a header and the request is sent as-is. Nothing is generated
///    and the context is not re-derived.
/// 2. **Header.** A non-empty header set by the caller is kept.
/// 3. **Generator.** Otherwise a fresh id is minted and added as a header.
///
/// In cases 2 and 3 the request is sent with a child context carrying the id.
#[derive(Clone, Debug)]
pub struct Outbound {
    config: Arc<Config>,
}

impl Outbound {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Interceptor<BoxedSender> for Outbound {
    fn wrap(&self, next: BoxedSender) -> BoxedSender {
        Arc::new(OutboundSender { config: Arc::clone(&self.config), next })
    }
}

struct OutboundSender {
    config: Arc<Config>,
    next: BoxedSender,
}

impl Sender for OutboundSender {
    fn send(&self, mut req: Request) -> BoxFuture<Result<Response, Error>> {
        let header = self.config.header_name.as_str();

        if let Some(id) = req.context().value(header).map(str::to_owned) {
            debug!(header, id = %id, "correlation id taken from context");
            req.add_header(header, &id);
            return self.next.send(req);
        }

        let existing = req.header(header)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.config.id_generator.generate(&req);
                debug!(header, id = %id, "generated correlation id");
                req.add_header(header, &id);
                id
            }
        };

        let context = req.context().with_value(header, id);
        self.next.send(req.with_context(context))
    }
}
