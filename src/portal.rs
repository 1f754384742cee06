use crate::{
    config::Portal as PortalConfig,
    entity::EntityKind,
    error::{PortalError, Result},
    metrics::{self, Method, Status},
    portal::{
        csrf::{CSRF_HEADER, CsrfToken},
        query::{ListQuery, QueryResponse},
    },
};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::future::Future;

pub mod csrf;
#[cfg(test)]
pub(crate) mod memory;
pub mod query;

/// The REST surface the controllers talk to.
///
/// Mutating calls take the CSRF token explicitly.
pub trait Backend {
    /// `GET /v1/{entity}/{id}`
    fn get(&self, kind: EntityKind, id: &str) -> impl Future<Output = Result<Value>>;

    /// `GET /v1/{entity}/query`
    fn query(
        &self,
        kind: EntityKind,
        query: &ListQuery,
    ) -> impl Future<Output = Result<QueryResponse>>;

    /// `PUT /v1/{entity}`, create-or-replace by the embedded id
    fn upsert(
        &self,
        kind: EntityKind,
        body: &Value,
        csrf: &CsrfToken,
    ) -> impl Future<Output = Result<()>>;

    /// `DELETE /v1/{entity}/{id}`
    fn delete(
        &self,
        kind: EntityKind,
        id: &str,
        csrf: &CsrfToken,
    ) -> impl Future<Output = Result<()>>;
}

/// HTTP client for the portal API
pub struct PortalClient {
    base: Url,
    client: Client,
}

impl PortalClient {
    /// Create a new client from the portal configuration
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .build()?;

        let base = Url::parse(config.url.trim_end_matches('/'))
            .map_err(|e| PortalError::InvalidTarget(format!("{}: {}", config.url, e)))?;
        if base.cannot_be_a_base() {
            return Err(PortalError::InvalidTarget(format!(
                "{} cannot carry a path",
                config.url
            )));
        }

        Ok(Self { base, client })
    }

    /// Build `{base}/v1/{entity}/{segments..}`, escaping every segment
    fn endpoint(&self, kind: EntityKind, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| PortalError::InvalidTarget(self.base.to_string()))?
            .pop_if_empty()
            .push("v1")
            .push(kind.collection())
            .extend(segments);

        Ok(url)
    }

    /// URL of a single record. Ids are opaque but must name exactly one path segment.
    fn record_url(&self, kind: EntityKind, id: &str) -> Result<Url> {
        if matches!(id, "" | "." | "..") {
            return Err(PortalError::InvalidTarget(format!(
                "'{}' is not a usable {} id",
                id,
                kind.route()
            )));
        }

        self.endpoint(kind, &[id])
    }

    /// Turn a non-success response into the matching error
    async fn check(
        &self,
        response: Response,
        kind: EntityKind,
        method: Method,
        id: Option<&str>,
    ) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            metrics::record_request(kind, method, Status::Success);
            return Ok(response);
        }

        metrics::record_request(kind, method, Status::Failure);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} {} failed: HTTP {}", method, kind, status);

        Err(PortalError::from_status(status, kind.collection(), id, body))
    }

    /// Record a transport failure and convert it
    fn network_failure(kind: EntityKind, method: Method, err: reqwest::Error) -> PortalError {
        metrics::record_request(kind, method, Status::Failure);
        tracing::warn!("{} {} failed: {}", method, kind, err);

        err.into()
    }
}

impl Backend for PortalClient {
    #[tracing::instrument(skip(self))]
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Value> {
        tracing::debug!("Fetching record");
        let _timer = metrics::request_timer(kind, Method::Get);

        let response = self
            .client
            .get(self.record_url(kind, id)?)
            .send()
            .await
            .map_err(|err| Self::network_failure(kind, Method::Get, err))?;

        let response = self.check(response, kind, Method::Get, Some(id)).await?;

        Ok(response.json::<Value>().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn query(&self, kind: EntityKind, query: &ListQuery) -> Result<QueryResponse> {
        tracing::debug!("Querying records");
        let _timer = metrics::request_timer(kind, Method::Query);

        let response = self
            .client
            .get(self.endpoint(kind, &["query"])?)
            .query(query)
            .send()
            .await
            .map_err(|err| Self::network_failure(kind, Method::Query, err))?;

        let response = self.check(response, kind, Method::Query, None).await?;

        Ok(response.json::<QueryResponse>().await?)
    }

    #[tracing::instrument(skip(self, body, csrf))]
    async fn upsert(&self, kind: EntityKind, body: &Value, csrf: &CsrfToken) -> Result<()> {
        tracing::debug!("Saving record");
        let _timer = metrics::request_timer(kind, Method::Upsert);

        let response = self
            .client
            .put(self.endpoint(kind, &[])?)
            .header(CSRF_HEADER, csrf.as_str())
            .json(body)
            .send()
            .await
            .map_err(|err| Self::network_failure(kind, Method::Upsert, err))?;

        let id = body.get("id").and_then(Value::as_str);
        self.check(response, kind, Method::Upsert, id).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, csrf))]
    async fn delete(&self, kind: EntityKind, id: &str, csrf: &CsrfToken) -> Result<()> {
        tracing::debug!("Deleting record");
        let _timer = metrics::request_timer(kind, Method::Delete);

        let response = self
            .client
            .delete(self.record_url(kind, id)?)
            .header(CSRF_HEADER, csrf.as_str())
            .send()
            .await
            .map_err(|err| Self::network_failure(kind, Method::Delete, err))?;

        self.check(response, kind, Method::Delete, Some(id)).await?;

        Ok(())
    }
}
