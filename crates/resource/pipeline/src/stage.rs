//! Request stages and the request boundary

use crate::context::Context;
use crate::error::Fault;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// What a stage produces: a response (terminal or short-circuit) or a fault.
pub type Outcome = Result<Response, Fault>;

type StageFn = dyn Fn(Context) -> BoxFuture<'static, Outcome> + Send + Sync;

/// A fully composed pipeline, ready to run against a request context.
#[derive(Clone)]
pub struct Stage {
    inner: Arc<StageFn>,
}

impl Stage {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let inner: Arc<StageFn> =
            Arc::new(move |ctx: Context| -> BoxFuture<'static, Outcome> { f(ctx).boxed() });
        Self { inner }
    }

    /// Run the pipeline within the caller's control flow.
    pub fn run(&self, ctx: Context) -> BoxFuture<'static, Outcome> {
        (self.inner)(ctx)
    }

    /// Serve a live request.
    ///
    /// This is the request boundary: faults are logged and answered with a
    /// bare `500`.
    pub async fn serve(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let ctx = match Context::from_request(request).await {
            Ok(ctx) => ctx,
            Err(response) => return response,
        };

        match self.run(ctx).await {
            Ok(response) => response,
            Err(fault) => {
                tracing::error!(%method, %path, error = %fault, "Request failed with unrecovered fault");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    /// Adapt this stage into a closure accepted by axum's method routers.
    pub fn into_handler(
        self,
    ) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
        move |request: Request| {
            let stage = self.clone();
            async move { stage.serve(request).await }.boxed()
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").finish_non_exhaustive()
    }
}
