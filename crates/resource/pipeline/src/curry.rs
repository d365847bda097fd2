//! Curried providers and pre-processors
//!
//! Providers are most naturally written as plain functions taking the
//! continuation first and the request context second. The `curry_*_provider`
//! helpers lift such a function into a provider, deferring the context until
//! the request arrives.
//!
//! Pre-processors run after resolution and before the wrapped continuation.
//! They may inspect the resolved values, log, validate, or end the request by
//! not calling the continuation. Each one wraps the continuation passed
//! inwards, so the pre-processor applied last runs last, directly in front of
//! the terminal handler:
//!
//! ```text
//! outer.apply(inner.apply(provider))(handler)
//!
//!   provider ──► inner check ──► outer check ──► handler
//! ```

use crate::context::Context;
use crate::handler::{ModelHandler, UserHandler, UserModelHandler};
use crate::provider::{ModelProvider, UserModelProvider, UserProvider};
use crate::stage::{Outcome, Stage};
use std::future::Future;
use std::sync::Arc;

/// A reusable provider-to-provider wrapper.
pub struct Processor<P> {
    wrap: Arc<dyn Fn(P) -> P + Send + Sync>,
}

impl<P> Processor<P> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(P) -> P + Send + Sync + 'static,
    {
        Self { wrap: Arc::new(f) }
    }

    /// Wrap `provider` with this processor's check.
    pub fn apply(&self, provider: P) -> P {
        (self.wrap)(provider)
    }
}

impl<P> Clone for Processor<P> {
    fn clone(&self) -> Self {
        Self {
            wrap: Arc::clone(&self.wrap),
        }
    }
}

/// Lift `fn(handler, ctx)` into a [`UserProvider`].
pub fn curry_user_provider<U, F, Fut>(f: F) -> UserProvider<U>
where
    U: Send + 'static,
    F: Fn(UserHandler<U>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    UserProvider::new(move |handler: UserHandler<U>| {
        let f = Arc::clone(&f);
        Stage::new(move |ctx: Context| f.as_ref()(handler.clone(), ctx))
    })
}

/// Lift `fn(handler, ctx)` into a [`ModelProvider`].
pub fn curry_model_provider<M, F, Fut>(f: F) -> ModelProvider<M>
where
    M: Send + 'static,
    F: Fn(ModelHandler<M>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    ModelProvider::new(move |handler: ModelHandler<M>| {
        let f = Arc::clone(&f);
        Stage::new(move |ctx: Context| f.as_ref()(handler.clone(), ctx))
    })
}

/// Lift `fn(handler, ctx)` into a [`UserModelProvider`].
pub fn curry_user_model_provider<U, M, F, Fut>(f: F) -> UserModelProvider<U, M>
where
    U: Send + 'static,
    M: Send + 'static,
    F: Fn(UserModelHandler<U, M>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    UserModelProvider::new(move |handler: UserModelHandler<U, M>| {
        let f = Arc::clone(&f);
        Stage::new(move |ctx: Context| f.as_ref()(handler.clone(), ctx))
    })
}

/// Lift `fn(accepter, ctx, user)` into a processor over user providers.
pub fn curry_user_processor<U, F, Fut>(f: F) -> Processor<UserProvider<U>>
where
    U: Send + 'static,
    F: Fn(UserHandler<U>, Context, U) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    Processor::new(move |provider: UserProvider<U>| {
        let f = Arc::clone(&f);
        UserProvider::new(move |accepter: UserHandler<U>| {
            let f = Arc::clone(&f);
            provider.provide(UserHandler::new(move |ctx: Context, user: U| {
                f.as_ref()(accepter.clone(), ctx, user)
            }))
        })
    })
}

/// Lift `fn(accepter, ctx, model)` into a processor over model providers.
pub fn curry_model_processor<M, F, Fut>(f: F) -> Processor<ModelProvider<M>>
where
    M: Send + 'static,
    F: Fn(ModelHandler<M>, Context, M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    Processor::new(move |provider: ModelProvider<M>| {
        let f = Arc::clone(&f);
        ModelProvider::new(move |accepter: ModelHandler<M>| {
            let f = Arc::clone(&f);
            provider.provide(ModelHandler::new(move |ctx: Context, model: M| {
                f.as_ref()(accepter.clone(), ctx, model)
            }))
        })
    })
}

/// Lift `fn(accepter, ctx, user, model)` into a processor over user + model
/// providers.
pub fn curry_user_model_processor<U, M, F, Fut>(f: F) -> Processor<UserModelProvider<U, M>>
where
    U: Send + 'static,
    M: Send + 'static,
    F: Fn(UserModelHandler<U, M>, Context, U, M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let f = Arc::new(f);
    Processor::new(move |provider: UserModelProvider<U, M>| {
        let f = Arc::clone(&f);
        UserModelProvider::new(move |accepter: UserModelHandler<U, M>| {
            let f = Arc::clone(&f);
            provider.provide(UserModelHandler::new(
                move |ctx: Context, user: U, model: M| {
                    f.as_ref()(accepter.clone(), ctx, user, model)
                },
            ))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode, Uri};
    use axum::response::IntoResponse;

    fn ctx() -> Context {
        Context::new(Method::GET, Uri::from_static("/items/3")).with_param("id", "3")
    }

    #[tokio::test]
    async fn test_curried_provider_receives_context() {
        let provider = curry_model_provider(|handler: ModelHandler<u64>, ctx: Context| async move {
            match ctx.param("id").and_then(|id| id.parse::<u64>().ok()) {
                Some(id) => handler.call(ctx, id).await,
                None => Ok(StatusCode::NOT_FOUND.into_response()),
            }
        });

        let stage = provider.provide(ModelHandler::new(|_ctx: Context, id: u64| async move {
            assert_eq!(id, 3);
            Ok(StatusCode::OK.into_response())
        }));

        assert_eq!(stage.run(ctx()).await.unwrap().status(), StatusCode::OK);
        let bare = Context::new(Method::GET, Uri::from_static("/items"));
        assert_eq!(stage.run(bare).await.unwrap().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_processor_can_short_circuit() {
        let users = curry_user_provider(|handler: UserHandler<u64>, ctx: Context| {
            handler.call(ctx, 7)
        });
        let only_admins = curry_user_processor(
            |accepter: UserHandler<u64>, ctx: Context, user: u64| async move {
                if user == 1 {
                    accepter.call(ctx, user).await
                } else {
                    Ok(StatusCode::UNAUTHORIZED.into_response())
                }
            },
        );

        let stage = only_admins
            .apply(users)
            .provide(UserHandler::new(|_ctx: Context, _user: u64| async {
                Ok(StatusCode::OK.into_response())
            }));

        let response = stage.run(ctx()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_processor_is_reusable() {
        let double_check = curry_model_processor(
            |accepter: ModelHandler<u64>, ctx: Context, model: u64| accepter.call(ctx, model * 2),
        );
        let models = curry_model_provider(|handler: ModelHandler<u64>, ctx: Context| {
            handler.call(ctx, 5)
        });

        let twice = double_check.apply(double_check.apply(models));
        let stage = twice.provide(ModelHandler::new(|_ctx: Context, model: u64| async move {
            assert_eq!(model, 20);
            Ok(StatusCode::OK.into_response())
        }));

        assert_eq!(stage.run(ctx()).await.unwrap().status(), StatusCode::OK);
    }
}
