//! API Router configuration
//!
//! Record routes are pipelines: the identity provider, the record lookup and
//! the ownership check are joined in front of each resource handler.

use super::handlers;
use super::state::AppState;
use crate::domain::{Account, Notebook};
use crate::identity::account_provider;
use axum::{
    routing::{get, post},
    Router,
};
use resource_core::{ParentChain, Resource, ResourceConfig};
use resource_pipeline::{merge, user_as_model};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let stores = &state.stores;
    let resources = &state.config.resources;

    let accounts = Resource::new(
        stores.accounts.clone(),
        ResourceConfig::new(resources.link("accounts")),
    );
    let notebooks = Resource::new(
        stores.notebooks.clone(),
        ResourceConfig::new(resources.link("notebooks"))
            .acceptable_error(resources.acceptable_error),
    );
    let pages = Resource::new(
        stores.pages.clone(),
        ResourceConfig::new(resources.link("pages"))
            .acceptable_error(resources.acceptable_error)
            .parent_owner(Arc::new(ParentChain::new(stores.notebooks.clone()))),
    );

    let users = account_provider(stores.accounts.clone());
    let me = user_as_model::<Account, Account>(users.clone());
    let account = accounts.owned(users.clone());
    let notebook = notebooks.owned(users.clone());
    let page = pages.owned(users.clone());

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Accounts
        .route(
            "/accounts",
            post(handlers::register_account(accounts.clone()).into_handler()),
        )
        .route("/accounts/me", get(me.provide(accounts.get()).into_handler()))
        .route("/accounts/:id", get(account.provide(accounts.get()).into_handler()))
        // Notebooks
        .route(
            "/notebooks",
            get(me.provide(notebooks.collection::<Account>()).into_handler()).post(
                merge(users.clone(), me.clone())
                    .provide(notebooks.post::<Account, Account>())
                    .into_handler(),
            ),
        )
        .route(
            "/notebooks/:id",
            get(notebook.provide(notebooks.get()).into_handler())
                .patch(notebook.provide(notebooks.patch()).into_handler())
                .delete(notebook.provide(notebooks.delete()).into_handler()),
        )
        // Pages
        .route(
            "/notebooks/:id/pages",
            get(notebook.provide(pages.collection::<Notebook>()).into_handler()).post(
                notebooks
                    .authorized(users)
                    .provide(pages.post::<Account, Notebook>())
                    .into_handler(),
            ),
        )
        .route(
            "/pages/:id",
            get(page.provide(pages.get()).into_handler())
                .patch(page.provide(pages.patch()).into_handler())
                .delete(page.provide(pages.delete()).into_handler()),
        );

    let max_body_size = state.config.server.max_body_size;
    let enable_cors = state.config.server.enable_cors;

    // Build router with middleware
    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
