//! Caller identity from the `X-Account-Id` header

use crate::domain::Account;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use resource_core::{parse_id, RecordStore};
use resource_pipeline::{curry_user_provider, Context, Fault, UserHandler, UserProvider};
use std::sync::Arc;

/// Header carrying the caller's account identifier
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Provide the calling account, answering `401` when the header is missing,
/// malformed, or names no account.
pub fn account_provider(accounts: Arc<dyn RecordStore<Account>>) -> UserProvider<Account> {
    curry_user_provider(move |handler: UserHandler<Account>, ctx: Context| {
        let accounts = Arc::clone(&accounts);
        async move {
            let Some(id) = ctx.header(ACCOUNT_HEADER).and_then(parse_id) else {
                tracing::debug!("Request without a usable account header");
                return Ok(StatusCode::UNAUTHORIZED.into_response());
            };

            match accounts.find(id).await.map_err(Fault::storage)? {
                Some(account) => handler.call(ctx, account).await,
                None => {
                    tracing::debug!(account_id = id, "Unknown account");
                    Ok(StatusCode::UNAUTHORIZED.into_response())
                }
            }
        }
    })
}
