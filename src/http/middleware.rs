//! Application-wide host guard middleware.
//!
//! `HostGuardLayer` is a tower layer; [`PreDispatch`] is the narrow hook the
//! guard needs from a framework to run before every matched route.

use std::task::{Context, Poll};

use axum::http::Request;
use axum::response::Response;
use axum::Router;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::guard::AllowedHosts;

/// Layer that checks every request against the host allowlist.
#[derive(Clone, Debug)]
pub struct HostGuardLayer {
    guard: AllowedHosts,
}

impl HostGuardLayer {
    pub fn new(guard: AllowedHosts) -> Self {
        Self { guard }
    }
}

impl<S> Layer<S> for HostGuardLayer {
    type Service = HostGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HostGuardService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

/// Service produced by [`HostGuardLayer`].
#[derive(Clone, Debug)]
pub struct HostGuardService<S> {
    inner: S,
    guard: AllowedHosts,
}

impl<S, B> Service<Request<B>> for HostGuardService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        match self.guard.admit(&mut req) {
            Ok(()) => {
                // Take the instance that was driven to readiness.
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                Box::pin(inner.call(req))
            }
            Err(denied) => Box::pin(async move { Ok(denied) }),
        }
    }
}

/// A framework object that accepts a pre-dispatch hook.
pub trait PreDispatch: Sized {
    /// Install `guard` so it runs before every route handler.
    fn register_pre_dispatch(self, guard: &AllowedHosts) -> Self;
}

impl<S> PreDispatch for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Uses `route_layer`: only routes registered so far are guarded, and
    /// unmatched paths still get a plain 404.
    fn register_pre_dispatch(self, guard: &AllowedHosts) -> Self {
        self.route_layer(guard.layer())
    }
}

impl AllowedHosts {
    pub fn layer(&self) -> HostGuardLayer {
        HostGuardLayer::new(self.clone())
    }

    /// Guard every route already registered on `app`.
    pub fn init_app<A: PreDispatch>(&self, app: A) -> A {
        tracing::info!(hosts = self.allowlist().len(), "Installing host guard");
        app.register_pre_dispatch(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::DenialPolicy;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    fn app(guard: &AllowedHosts) -> Router {
        let guarded = Router::new().route("/api", get(|| async { "hello" }));
        guard
            .init_app(guarded)
            .route("/custom-error", get(|| async { "nope" }))
    }

    fn get_with_host(path: &str, host: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header("Host", host)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_hook_allows_listed_host() {
        let guard = AllowedHosts::new(["localhost:5000"]).unwrap();
        let response = app(&guard)
            .oneshot(get_with_host("/api", "localhost:5000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_hook_denies_unlisted_host() {
        let guard = AllowedHosts::new(["localhost:5000"]).unwrap();
        let response = app(&guard)
            .oneshot(get_with_host("/api", "evil.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_routes_after_hook_are_unguarded() {
        let guard = AllowedHosts::builder()
            .allowed_hosts(["localhost:5000"])
            .on_denied(DenialPolicy::redirect("/custom-error"))
            .build()
            .unwrap();
        let response = app(&guard)
            .oneshot(get_with_host("/custom-error", "evil.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let guard = AllowedHosts::new(["localhost:5000"]).unwrap();
        let response = app(&guard)
            .oneshot(get_with_host("/missing", "evil.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
