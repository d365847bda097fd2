//! Finder stages: lookup by identifier and the ownership check
//!
//! ```text
//! authorized(users)
//!
//!   lookup(:id) ──► users ──► ownership check ──► handler(user, record)
//!       │                          │
//!       └─► 404                    └─► 401
//! ```

use crate::error::Rejection;
use crate::owner::ParentOwner;
use crate::record::{Identity, Record, RecordId};
use crate::store::RecordStore;
use axum::response::IntoResponse;
use resource_pipeline::{
    curry_model_provider, curry_user_model_processor, Context, Fault, ModelHandler, ModelProvider,
    Processor, UserModelHandler, UserModelProvider,
};
use std::sync::Arc;

/// Parse a path segment as a record identifier.
///
/// Only plain ASCII digits are accepted; signs, whitespace and values that
/// overflow are rejected.
pub fn parse_id(raw: &str) -> Option<RecordId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Provider that loads the record named by path parameter `key`.
///
/// Answers `404` when the parameter is missing or malformed, or when no live
/// record has that identifier. Performs no authorisation.
pub fn lookup<R: Record>(store: Arc<dyn RecordStore<R>>, key: impl Into<String>) -> ModelProvider<R> {
    let key: Arc<str> = Arc::from(key.into());

    curry_model_provider(move |handler: ModelHandler<R>, ctx: Context| {
        let store = Arc::clone(&store);
        let key = Arc::clone(&key);
        async move {
            let Some(id) = ctx.param(&key).and_then(parse_id) else {
                tracing::debug!(kind = R::KIND, key = %key, "Malformed or missing record identifier");
                return Ok(Rejection::NotFound.into_response());
            };

            match store.find(id).await.map_err(Fault::storage)? {
                Some(record) => handler.call(ctx, record).await,
                None => {
                    tracing::debug!(kind = R::KIND, record_id = id, "Record not found");
                    Ok(Rejection::NotFound.into_response())
                }
            }
        }
    })
}

/// Work out who owns `record`, following the parent chain when the record
/// does not store its owner.
pub async fn resolve_owner<R: Record>(
    record: &R,
    parents: Option<&dyn ParentOwner>,
) -> Result<Option<RecordId>, Fault> {
    if let Some(owner) = record.owner_id() {
        return Ok(Some(owner));
    }

    let parents = parents.ok_or_else(|| {
        Fault::Linkage(format!(
            "{} derives ownership from its parent but no parent resolver is configured",
            R::KIND
        ))
    })?;

    parents
        .owner_of(record.parent_id())
        .await
        .map_err(Fault::storage)
}

/// Pre-processor comparing the resolved user against the record's owner.
///
/// Forwards the record unchanged on a match and answers `401` otherwise. It
/// resolves no new value.
pub fn ownership_check<U, R>(
    parents: Option<Arc<dyn ParentOwner>>,
) -> Processor<UserModelProvider<U, R>>
where
    U: Identity + Send + 'static,
    R: Record,
{
    curry_user_model_processor(
        move |accepter: UserModelHandler<U, R>, ctx: Context, user: U, record: R| {
            let parents = parents.clone();
            async move {
                let owner = resolve_owner(&record, parents.as_deref()).await?;

                if owner != Some(user.id()) {
                    tracing::debug!(
                        kind = R::KIND,
                        record_id = record.id(),
                        caller_id = user.id(),
                        owner_id = ?owner,
                        "Caller does not own record"
                    );
                    return Ok(Rejection::Unauthorized.into_response());
                }

                accepter.call(ctx, user, record).await
            }
        },
    )
}
