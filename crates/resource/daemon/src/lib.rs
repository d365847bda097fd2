//! Resource daemon library
//!
//! This module provides the components of the notebook service:
//! - Record types with flat (notebooks) and chained (pages) ownership
//! - Caller identity from the `X-Account-Id` header
//! - REST API assembled from resource pipelines
//! - In-memory and PostgreSQL storage backends
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod server;
pub mod storage;

pub use config::DaemonConfig;
pub use error::{DaemonError, DaemonResult};
pub use server::Server;
pub use storage::Stores;
