//! Terminal continuations for the three resolution shapes
//!
//! A handler is the end of a pipeline: it receives the request context and
//! the values resolved by the providers in front of it, and produces the
//! response. Handlers are cheap to clone; cloning shares the underlying
//! function.

use crate::context::Context;
use crate::stage::Outcome;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

type UserFn<U> = dyn Fn(Context, U) -> BoxFuture<'static, Outcome> + Send + Sync;
type ModelFn<M> = dyn Fn(Context, M) -> BoxFuture<'static, Outcome> + Send + Sync;
type UserModelFn<U, M> = dyn Fn(Context, U, M) -> BoxFuture<'static, Outcome> + Send + Sync;

/// Handler that requires a resolved user.
pub struct UserHandler<U> {
    inner: Arc<UserFn<U>>,
}

impl<U: Send + 'static> UserHandler<U> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let inner: Arc<UserFn<U>> =
            Arc::new(move |ctx: Context, user: U| -> BoxFuture<'static, Outcome> {
                f(ctx, user).boxed()
            });
        Self { inner }
    }

    pub fn call(&self, ctx: Context, user: U) -> BoxFuture<'static, Outcome> {
        (self.inner)(ctx, user)
    }
}

impl<U> Clone for UserHandler<U> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handler that requires a resolved model.
pub struct ModelHandler<M> {
    inner: Arc<ModelFn<M>>,
}

impl<M: Send + 'static> ModelHandler<M> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let inner: Arc<ModelFn<M>> =
            Arc::new(move |ctx: Context, model: M| -> BoxFuture<'static, Outcome> {
                f(ctx, model).boxed()
            });
        Self { inner }
    }

    pub fn call(&self, ctx: Context, model: M) -> BoxFuture<'static, Outcome> {
        (self.inner)(ctx, model)
    }
}

impl<M> Clone for ModelHandler<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handler that requires both a resolved user and a resolved model.
pub struct UserModelHandler<U, M> {
    inner: Arc<UserModelFn<U, M>>,
}

impl<U: Send + 'static, M: Send + 'static> UserModelHandler<U, M> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, U, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let inner: Arc<UserModelFn<U, M>> = Arc::new(
            move |ctx: Context, user: U, model: M| -> BoxFuture<'static, Outcome> {
                f(ctx, user, model).boxed()
            },
        );
        Self { inner }
    }

    pub fn call(&self, ctx: Context, user: U, model: M) -> BoxFuture<'static, Outcome> {
        (self.inner)(ctx, user, model)
    }
}

impl<U, M> Clone for UserModelHandler<U, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
