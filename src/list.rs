//! Generic paginated, searchable list.
//!
//! A [`PaginatedList`] holds "page N of entity E matching query Q" and is
//! refreshed through a single re-issuable [`PaginatedList::query`]. The
//! network work is delegated to an injected [`FetchStrategy`]. Every call is
//! tagged with a sequence number and only the latest issued call may update
//! the state, so a slow response can never overwrite a newer one.

use crate::{
    entity::Entity,
    error::{PortalError, Result},
    portal::{
        Backend,
        query::{ListQuery, Page, Pagination},
    },
};
use std::{
    future::Future,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::watch;

/// Fetches one page of records for a query
pub trait FetchStrategy<E> {
    fn fetch(&self, query: ListQuery) -> impl Future<Output = Result<Page<E>>>;
}

impl<E, F, Fut> FetchStrategy<E> for F
where
    F: Fn(ListQuery) -> Fut,
    Fut: Future<Output = Result<Page<E>>>,
{
    fn fetch(&self, query: ListQuery) -> impl Future<Output = Result<Page<E>>> {
        self(query)
    }
}

/// Stock strategy: `GET /v1/{entity}/query` on a backend, decoding every record
pub struct EntityFetch<E, B> {
    backend: Arc<B>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, B> EntityFetch<E, B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, B: Backend> FetchStrategy<E> for EntityFetch<E, B> {
    async fn fetch(&self, query: ListQuery) -> Result<Page<E>> {
        let response = self.backend.query(E::KIND, &query).await?;

        let items = response
            .data
            .into_iter()
            .map(E::decode)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            pagination: response.pagination,
        })
    }
}

/// Observable state of a list
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<E> {
    /// Current page contents, replaced wholesale on every applied fetch
    pub items: Vec<E>,
    pub pagination: Pagination,
    /// Parameters of the most recently issued query
    pub query: ListQuery,
    /// Failure of the latest query; stale items are kept alongside it
    pub error: Option<PortalError>,
    pub loading: bool,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            query: ListQuery::default(),
            error: None,
            loading: false,
        }
    }
}

/// What happened to the response of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Applied,
    /// A newer query was issued before this one completed; its result was dropped
    Superseded,
}

pub struct PaginatedList<E, F> {
    fetch: F,
    state: watch::Sender<ListState<E>>,
    issued: AtomicU64,
}

impl<E: Clone, F: FetchStrategy<E>> PaginatedList<E, F> {
    pub fn new(fetch: F) -> Self {
        let (state, _) = watch::channel(ListState::default());

        Self {
            fetch,
            state,
            issued: AtomicU64::new(0),
        }
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<ListState<E>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<E> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<E> {
        self.state.borrow().items.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination.clone()
    }

    pub fn error(&self) -> Option<PortalError> {
        self.state.borrow().error.clone()
    }

    /// Fetch a page and replace the list contents with it.
    ///
    /// `None` re-issues the last query. Returns the fetch error only when
    /// this call was still the latest one on completion.
    pub async fn query(&self, params: Option<ListQuery>) -> Result<QueryOutcome> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let mut query = ListQuery::default();
        self.state.send_modify(|state| {
            if let Some(params) = params {
                state.query = params;
            }
            state.loading = true;
            query = state.query.clone();
        });

        tracing::debug!(seq, ?query, "Issuing list query");
        let result = self.fetch.fetch(query).await;

        if self.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "Discarding superseded list response");
            return Ok(QueryOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                tracing::debug!(seq, items = page.items.len(), "Applying list response");
                self.state.send_modify(|state| {
                    state.items = page.items;
                    state.pagination = page.pagination;
                    state.error = None;
                    state.loading = false;
                });

                Ok(QueryOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!("List query failed: {}", err);
                self.state.send_modify(|state| {
                    state.error = Some(err.clone());
                    state.loading = false;
                });

                Err(err)
            }
        }
    }
}
