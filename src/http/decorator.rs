//! Per-route guard decorator.

use std::future::ready;

use axum::extract::Request;
use axum::handler::Handler;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::error::GuardError;
use crate::guard::AllowedHosts;

/// A handler that only runs for requests from allowed hosts.
///
/// Denied requests get the guard's denial response; the wrapped handler is
/// never called for them.
#[derive(Clone, Debug)]
pub struct Guarded<H> {
    guard: AllowedHosts,
    handler: H,
}

impl<H, T, S> Handler<T, S> for Guarded<H>
where
    H: Handler<T, S>,
    T: 'static,
{
    type Future = BoxFuture<'static, Response>;

    fn call(self, mut req: Request, state: S) -> Self::Future {
        match self.guard.admit(&mut req) {
            Ok(()) => Box::pin(self.handler.call(req, state)),
            Err(denied) => Box::pin(ready(denied)),
        }
    }
}

impl AllowedHosts {
    /// Wrap a single handler with this guard.
    pub fn limit<H>(&self, handler: H) -> Guarded<H> {
        Guarded {
            guard: self.clone(),
            handler,
        }
    }
}

/// Guard one handler with a fixed allowlist and the default `403` denial.
pub fn check_host<I, T, H>(allowed_hosts: I, handler: H) -> Result<Guarded<H>, GuardError>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    Ok(AllowedHosts::new(allowed_hosts)?.limit(handler))
}
