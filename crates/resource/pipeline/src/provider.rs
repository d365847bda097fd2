//! Providers and the combinators that join them
//!
//! A provider knows how to "find" a value for a request. Given the
//! continuation that needs the value, it returns a [`Stage`] which, when run,
//! resolves the value and hands it to the continuation. Providers never
//! transform what they find, and they may end the request themselves (not
//! found, unauthorized) without calling the continuation at all.
//!
//! ```text
//! merge(users, models)(handler)
//!
//!   models ──► model continuation ──► users ──► user continuation ──► handler(user, model)
//! ```

use crate::context::Context;
use crate::error::Fault;
use crate::handler::{ModelHandler, UserHandler, UserModelHandler};
use crate::stage::Stage;
use std::sync::Arc;

type UserProviderFn<U> = dyn Fn(UserHandler<U>) -> Stage + Send + Sync;
type ModelProviderFn<M> = dyn Fn(ModelHandler<M>) -> Stage + Send + Sync;
type UserModelProviderFn<U, M> = dyn Fn(UserModelHandler<U, M>) -> Stage + Send + Sync;

/// Provides a user to a [`UserHandler`].
pub struct UserProvider<U> {
    inner: Arc<UserProviderFn<U>>,
}

impl<U: Send + 'static> UserProvider<U> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(UserHandler<U>) -> Stage + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Bind the continuation, producing a runnable stage.
    pub fn provide(&self, handler: UserHandler<U>) -> Stage {
        (self.inner)(handler)
    }
}

impl<U> Clone for UserProvider<U> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Provides a model to a [`ModelHandler`].
pub struct ModelProvider<M> {
    inner: Arc<ModelProviderFn<M>>,
}

impl<M: Send + 'static> ModelProvider<M> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ModelHandler<M>) -> Stage + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Bind the continuation, producing a runnable stage.
    pub fn provide(&self, handler: ModelHandler<M>) -> Stage {
        (self.inner)(handler)
    }
}

impl<M> Clone for ModelProvider<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Provides a user and a model to a [`UserModelHandler`].
pub struct UserModelProvider<U, M> {
    inner: Arc<UserModelProviderFn<U, M>>,
}

impl<U: Send + 'static, M: Send + 'static> UserModelProvider<U, M> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(UserModelHandler<U, M>) -> Stage + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Bind the continuation, producing a runnable stage.
    pub fn provide(&self, handler: UserModelHandler<U, M>) -> Stage {
        (self.inner)(handler)
    }
}

impl<U, M> Clone for UserModelProvider<U, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Combine a user provider and a model provider into a provider of both.
///
/// The model provider is the outer stage: model resolution always starts
/// before user resolution, and the user provider only runs from inside the
/// model continuation. If either provider ends the request early the joint
/// handler is never called.
///
/// Typical use: `users` authenticates the caller, `models` loads the record
/// named in the URL.
pub fn merge<U, M>(users: UserProvider<U>, models: ModelProvider<M>) -> UserModelProvider<U, M>
where
    U: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    UserModelProvider::new(move |accepter: UserModelHandler<U, M>| {
        let users = users.clone();
        models.provide(ModelHandler::new(move |ctx: Context, model: M| {
            let accepter = accepter.clone();
            users
                .provide(UserHandler::new(move |ctx: Context, user: U| {
                    accepter.call(ctx, user, model.clone())
                }))
                .run(ctx)
        }))
    })
}

/// Reinterpret a provided user as a model.
///
/// Only meaningful when the caller knows the concrete user type is also a
/// model. A failed conversion is a programming error and surfaces as
/// [`Fault::Conversion`]; the model handler is not called.
pub fn user_as_model<U, M>(users: UserProvider<U>) -> ModelProvider<M>
where
    U: Send + 'static,
    M: TryFrom<U> + Send + 'static,
    M::Error: std::fmt::Display,
{
    ModelProvider::new(move |accepter: ModelHandler<M>| {
        users.provide(UserHandler::new(move |ctx: Context, user: U| {
            let accepter = accepter.clone();
            let model = M::try_from(user).map_err(Fault::conversion::<U, M>);
            async move { accepter.call(ctx, model?).await }
        }))
    })
}

/// Turn a user + model provider into a model provider by dropping the user.
pub fn discard_user<U, M>(provider: UserModelProvider<U, M>) -> ModelProvider<M>
where
    U: Send + 'static,
    M: Send + 'static,
{
    ModelProvider::new(move |accepter: ModelHandler<M>| {
        provider.provide(UserModelHandler::new(move |ctx: Context, _user: U, model: M| {
            accepter.call(ctx, model)
        }))
    })
}
