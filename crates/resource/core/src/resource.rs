//! Resource factory: CRUD handlers and finders for one record type

use crate::error::{Rejection, StoreError, StoreErrorKind};
use crate::finder;
use crate::link;
use crate::owner::ParentOwner;
use crate::record::{attach, Identity, PartialUpdate, Record, RecordId};
use crate::store::RecordStore;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use resource_pipeline::{
    discard_user, merge, Context, Fault, ModelHandler, ModelProvider, Outcome, Processor,
    UserModelHandler, UserModelProvider, UserProvider,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Message returned when a request body does not bind to the record shape.
pub const BIND_FAILURE: &str = "couldn't bind resource";

type LinkFn = dyn Fn(RecordId) -> String + Send + Sync;

/// Per-resource settings fixed at route registration.
#[derive(Clone)]
pub struct ResourceConfig {
    link: Arc<LinkFn>,
    acceptable: Option<StoreErrorKind>,
    parents: Option<Arc<dyn ParentOwner>>,
    id_key: String,
}

impl ResourceConfig {
    /// `link` maps a record identifier to its canonical path.
    pub fn new<F>(link: F) -> Self
    where
        F: Fn(RecordId) -> String + Send + Sync + 'static,
    {
        Self {
            link: Arc::new(link),
            acceptable: None,
            parents: None,
            id_key: "id".to_string(),
        }
    }

    /// Storage errors of this kind answer `422` on create instead of faulting.
    pub fn acceptable_error(mut self, kind: impl Into<Option<StoreErrorKind>>) -> Self {
        self.acceptable = kind.into();
        self
    }

    /// Resolver used by the ownership check for records with chained ownership.
    pub fn parent_owner(mut self, parents: Arc<dyn ParentOwner>) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Path parameter holding the record identifier.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    pub fn link(&self, id: RecordId) -> String {
        (self.link)(id)
    }

    fn is_acceptable(&self, err: &StoreError) -> bool {
        self.acceptable == Some(err.kind())
    }
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("acceptable", &self.acceptable)
            .field("chained", &self.parents.is_some())
            .field("id_key", &self.id_key)
            .finish()
    }
}

/// Handlers and finders for records of type `R`.
///
/// ```text
/// GET    /things       owner provider  ──► collection
/// POST   /things       user + parent   ──► post
/// GET    /things/:id   owned(users)    ──► get
/// PATCH  /things/:id   owned(users)    ──► patch
/// DELETE /things/:id   owned(users)    ──► delete
/// ```
pub struct Resource<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    config: ResourceConfig,
}

impl<R: Record> Clone for Resource<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<R: Record> Resource<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>, config: ResourceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore<R>> {
        &self.store
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// List the records whose parent is the resolved owner.
    pub fn collection<P>(&self) -> ModelHandler<P>
    where
        P: Identity + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        ModelHandler::new(move |_ctx: Context, parent: P| {
            let store = Arc::clone(&store);
            let parent_id = parent.id();
            async move {
                let records = store.related(parent_id).await.map_err(Fault::storage)?;
                json(StatusCode::OK, &records)
            }
        })
    }

    /// Create a record owned by the resolved user under the resolved parent.
    pub fn post<U, P>(&self) -> UserModelHandler<U, P>
    where
        U: Identity + Send + 'static,
        P: Identity + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let config = self.config.clone();

        UserModelHandler::new(move |ctx: Context, user: U, parent: P| {
            let store = Arc::clone(&store);
            let config = config.clone();
            async move {
                let mut record: R = match ctx.json() {
                    Ok(record) => record,
                    Err(err) => {
                        tracing::debug!(kind = R::KIND, error = %err, "Create body did not bind");
                        return Ok(Rejection::Unprocessable(BIND_FAILURE.to_string()).into_response());
                    }
                };
                attach(&mut record, &user, &parent)?;
                let base = link::base(&ctx)?;

                let saved = match store.create(record).await {
                    Ok(saved) => saved,
                    Err(err) if config.is_acceptable(&err) => {
                        tracing::warn!(kind = R::KIND, error = %err, "Create refused by storage");
                        return Ok(Rejection::Unprocessable(err.to_string()).into_response());
                    }
                    Err(err) => return Err(Fault::storage(err)),
                };

                tracing::info!(
                    kind = R::KIND,
                    record_id = saved.id(),
                    owner_id = user.id(),
                    parent_id = parent.id(),
                    "Record created"
                );

                created(&base, &config.link(saved.id()), &saved)
            }
        })
    }

    /// Return the resolved record.
    pub fn get(&self) -> ModelHandler<R> {
        ModelHandler::new(|_ctx: Context, record: R| async move { json(StatusCode::OK, &record) })
    }

    /// Apply the submitted fields to the resolved record and persist it.
    pub fn patch(&self) -> ModelHandler<R> {
        let store = Arc::clone(&self.store);

        ModelHandler::new(move |ctx: Context, mut record: R| {
            let store = Arc::clone(&store);
            async move {
                let patch: R::Patch = match ctx.json() {
                    Ok(patch) => patch,
                    Err(err) => {
                        tracing::debug!(
                            kind = R::KIND,
                            record_id = record.id(),
                            error = %err,
                            "Update body did not bind"
                        );
                        return Ok(Rejection::Unprocessable(BIND_FAILURE.to_string()).into_response());
                    }
                };
                if patch.is_empty() {
                    tracing::debug!(kind = R::KIND, record_id = record.id(), "Update body named no field");
                    return Ok(Rejection::Unprocessable(BIND_FAILURE.to_string()).into_response());
                }
                record.apply(patch);

                let updated = store.update(record).await.map_err(Fault::storage)?;
                tracing::info!(kind = R::KIND, record_id = updated.id(), "Record updated");

                json(StatusCode::OK, &updated)
            }
        })
    }

    /// Delete the resolved record.
    pub fn delete(&self) -> ModelHandler<R> {
        let store = Arc::clone(&self.store);

        ModelHandler::new(move |_ctx: Context, record: R| {
            let store = Arc::clone(&store);
            async move {
                store.delete(&record).await.map_err(Fault::storage)?;
                tracing::info!(kind = R::KIND, record_id = record.id(), "Record deleted");
                Ok(StatusCode::NO_CONTENT.into_response())
            }
        })
    }

    /// Load the record named by path parameter `key`, answering `404` when
    /// there is none.
    pub fn provide_model_for_key(&self, key: &str) -> ModelProvider<R> {
        finder::lookup(Arc::clone(&self.store), key)
    }

    /// [`Resource::provide_model_for_key`] with the configured identifier key.
    pub fn provide_model(&self) -> ModelProvider<R> {
        self.provide_model_for_key(&self.config.id_key)
    }

    /// Ownership check over any user + record provider.
    pub fn authorize<U>(&self) -> Processor<UserModelProvider<U, R>>
    where
        U: Identity + Send + 'static,
    {
        finder::ownership_check(self.config.parents.clone())
    }

    /// Caller and record, the record looked up by identifier and checked
    /// against the caller.
    pub fn authorized<U>(&self, users: UserProvider<U>) -> UserModelProvider<U, R>
    where
        U: Identity + Send + 'static,
    {
        self.authorize().apply(merge(users, self.provide_model()))
    }

    /// [`Resource::authorized`] without the caller.
    pub fn owned<U>(&self, users: UserProvider<U>) -> ModelProvider<R>
    where
        U: Identity + Send + 'static,
    {
        discard_user(self.authorized(users))
    }
}

/// Serialize `value` as a JSON response with `status`.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Outcome {
    let body = serde_json::to_vec(value)?;
    Ok((
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}

/// `201 Created` with `body` and a `Location` header resolving `link`
/// against `base`, the request URL from [`link::base`].
///
/// Take `base` before writing so nothing about the request can fail the
/// response once the record is stored.
pub fn created<T: Serialize + ?Sized>(base: &Url, link: &str, body: &T) -> Outcome {
    let location = link::resolve(base, link)?;
    let location =
        HeaderValue::try_from(location).map_err(|err| Fault::Location(err.to_string()))?;

    let mut response = json(StatusCode::CREATED, body)?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}
