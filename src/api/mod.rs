//! REST client for the backend API.
//!
//! Every request carries the active company slug in `X-Company-ID` and, when
//! a token is held, `Authorization: Bearer`. A 401 response clears the local
//! session through the injected store; no redirect or retry happens here.

pub mod response;
pub mod transport;

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::session::{normalize_slug, SessionStore};

pub use response::{normalize_list, ListData};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

pub const COMPANY_HEADER: &str = "X-Company-ID";

pub struct ApiClient {
    base: Url,
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// `base_url` is the backend origin, `prefix` the versioned API path
    /// (e.g. `/api/v1`). Endpoint paths are joined relative to the prefix.
    pub fn new(
        base_url: &str,
        prefix: &str,
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let joined = format!(
            "{}/{}/",
            base_url.trim_end_matches('/'),
            prefix.trim_matches('/')
        );
        let base = Url::parse(&joined)
            .map_err(|e| ApiError::network(format!("invalid API base URL {}: {}", joined, e)))?;
        Ok(Self { base, transport, store })
    }

    pub fn from_config(store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let cfg = crate::config::config();
        let transport = Arc::new(HttpTransport::new(cfg.api.timeout_secs)?);
        Self::new(&cfg.api.base_url, &cfg.api.prefix, transport, store)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn get_list(&self, path: &str, query: &[(String, String)]) -> Result<ListData, ApiError> {
        let body = self.get(path, query).await?;
        Ok(normalize_list(body))
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::POST, path, &[], Some(body.clone())).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, &[], Some(body.clone())).await
    }

    /// DELETE returns 204 with an empty body on success.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, &[], None).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(method, path, query, body)?;
        let response = self.transport.execute(request).await?;

        if (200..300).contains(&response.status) {
            return Ok(response.body);
        }

        let error = ApiError::from_response(response.status, &response.body);
        if error.is_unauthorized() {
            // Stale or revoked token: drop the local session and tenant
            // selection. Navigation is the caller's concern.
            tracing::warn!(path, "401 from backend, clearing local session");
            if let Err(e) = self.store.clear() {
                tracing::error!("failed to clear session after 401: {}", e);
            }
        }
        Err(error)
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<ApiRequest, ApiError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::network(format!("invalid endpoint path {}: {}", path, e)))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        let session = self
            .store
            .load()
            .map_err(|e| ApiError::network(format!("failed to load session: {}", e)))?;

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(slug) = session.active_company().and_then(normalize_slug) {
            headers.push((COMPANY_HEADER.to_string(), slug));
        }
        if let Some(token) = &session.access_token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        Ok(ApiRequest { method, url, headers, body })
    }
}
