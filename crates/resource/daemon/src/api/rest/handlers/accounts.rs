//! Account registration

use crate::domain::Account;
use axum::response::IntoResponse;
use resource_core::{created, link, Identity, Rejection, Resource, BIND_FAILURE};
use resource_pipeline::{Context, Fault, Stage};

/// `POST /accounts`: register a new account.
///
/// Registration is the one write without a caller, so it skips the identity
/// provider and talks to the store directly.
pub fn register_account(accounts: Resource<Account>) -> Stage {
    Stage::new(move |ctx: Context| {
        let accounts = accounts.clone();
        async move {
            let account: Account = match ctx.json() {
                Ok(account) => account,
                Err(err) => {
                    tracing::debug!(error = %err, "Registration body did not bind");
                    return Ok(Rejection::Unprocessable(BIND_FAILURE.to_string()).into_response());
                }
            };
            let base = link::base(&ctx)?;

            let account = accounts
                .store()
                .create(account)
                .await
                .map_err(Fault::storage)?;
            tracing::info!(account_id = account.id(), "Account registered");

            created(&base, &accounts.config().link(account.id()), &account)
        }
    })
}
