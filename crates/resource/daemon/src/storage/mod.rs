//! Storage backends for resource-daemon

mod postgres;

pub use postgres::{connect, PostgresStore};

use crate::config::StorageConfig;
use crate::domain::{Account, Notebook, Page};
use crate::error::DaemonResult;
use resource_core::{InMemoryStore, RecordStore};
use std::sync::Arc;

/// One store per record kind, all on the same backend.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn RecordStore<Account>>,
    pub notebooks: Arc<dyn RecordStore<Notebook>>,
    pub pages: Arc<dyn RecordStore<Page>>,
}

impl Stores {
    /// In-memory stores (for development/testing)
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryStore::<Account>::new()),
            notebooks: Arc::new(
                InMemoryStore::<Notebook>::new().with_unique_key(|n: &Notebook| n.title.clone()),
            ),
            pages: Arc::new(InMemoryStore::<Page>::new()),
        }
    }

    /// PostgreSQL stores sharing one pool
    pub async fn postgres(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> DaemonResult<Self> {
        let pool = connect(url, max_connections, connect_timeout_secs).await?;

        Ok(Self {
            accounts: Arc::new(PostgresStore::<Account>::new(pool.clone(), None).await?),
            notebooks: Arc::new(PostgresStore::<Notebook>::new(pool.clone(), Some("title")).await?),
            pages: Arc::new(PostgresStore::<Page>::new(pool, None).await?),
        })
    }

    pub async fn from_config(config: &StorageConfig) -> DaemonResult<Self> {
        match config {
            StorageConfig::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::memory())
            }
            StorageConfig::Postgres {
                url,
                max_connections,
                connect_timeout_secs,
            } => {
                tracing::info!(max_connections, "Using PostgreSQL storage");
                Self::postgres(url, *max_connections, *connect_timeout_secs).await
            }
        }
    }
}
