//! Request pipelines built from independently testable stages
//!
//! This crate provides the composition layer for resource endpoints:
//! - [`UserProvider`], [`ModelProvider`] and [`UserModelProvider`] resolve
//!   values and forward them to a continuation
//! - [`UserHandler`], [`ModelHandler`] and [`UserModelHandler`] end a pipeline
//! - [`merge`], [`discard_user`] and [`user_as_model`] join and adapt providers
//! - `curry_*` helpers lift plain functions into providers and pre-processors
//! - [`Stage`] runs a composed pipeline and acts as the request boundary
//!
//! Pipelines are assembled once per route. Every resolved value is local to
//! the request that resolved it.

pub mod context;
pub mod curry;
pub mod error;
pub mod handler;
pub mod provider;
pub mod stage;

pub use context::Context;
pub use curry::{
    curry_model_processor, curry_model_provider, curry_user_model_processor,
    curry_user_model_provider, curry_user_processor, curry_user_provider, Processor,
};
pub use error::{BoxError, Fault, FaultResult};
pub use handler::{ModelHandler, UserHandler, UserModelHandler};
pub use provider::{discard_user, merge, user_as_model, ModelProvider, UserModelProvider, UserProvider};
pub use stage::{Outcome, Stage};
