//! Server-side correlation interceptor.

use std::sync::Arc;

use tracing::debug;

use super::Config;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::stack::Interceptor;

/// Assigns or adopts a correlation id for every request a handler receives.
///
/// 1. An existing, non-empty header value is reused verbatim. Otherwise an id
///    is generated and written into the request header.
/// 2. The id is stored in the request context under the header name.
/// 3. The response carries the same header back to the caller.
#[derive(Clone, Debug)]
pub struct Inbound {
    config: Arc<Config>,
}

impl Inbound {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Interceptor<BoxedHandler> for Inbound {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(InboundHandler { config: Arc::clone(&self.config), next })
    }
}

struct InboundHandler {
    config: Arc<Config>,
    next: BoxedHandler,
}

impl Handler for InboundHandler {
    fn call(&self, mut req: Request) -> BoxFuture<Response> {
        let header = self.config.header_name.as_str();

        let existing = req.header(header)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.config.id_generator.generate(&req);
                debug!(header, id = %id, "generated correlation id");
                req.set_header(header, &id);
                id
            }
        };

        let context = req.context().with_value(header, id.as_str());
        let req = req.with_context(context);

        let header = header.to_owned();
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            let mut res = next.call(req).await;
            res.set_header(&header, &id);
            res
        })
    }
}
