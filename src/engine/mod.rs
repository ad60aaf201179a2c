//! CRUD operations, permission gating and navigation for one resource,
//! driven entirely by its [`ResourceConfig`].

use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value};

use crate::api::ApiClient;
use crate::config::PermissionPolicy;
use crate::error::ApiError;
use crate::resource::{validate_values, ResourceConfig};
use crate::session::SessionStore;
use crate::table::{default_row_key, TableOptions, TableState};

/// Conventional client-side routes for a resource, derived from its plural
/// name. Convenience only; nothing correctness-critical consumes these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoutes {
    base: String,
}

impl ResourceRoutes {
    pub fn list(&self) -> String {
        self.base.clone()
    }

    pub fn create(&self) -> String {
        format!("{}/new", self.base)
    }

    pub fn detail(&self, id: &str) -> String {
        format!("{}/{}", self.base, id)
    }

    pub fn edit(&self, id: &str) -> String {
        format!("{}/{}/edit", self.base, id)
    }
}

/// Aggregate result of a bulk delete.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BulkOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ResourceEngine {
    config: ResourceConfig,
    client: Arc<ApiClient>,
    store: Arc<dyn SessionStore>,
    policy: PermissionPolicy,
    table: TableState,
}

impl ResourceEngine {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn SessionStore>, config: ResourceConfig) -> Self {
        Self::with_policy(client, store, config, crate::config::config().security.permission_policy)
    }

    pub fn with_policy(
        client: Arc<ApiClient>,
        store: Arc<dyn SessionStore>,
        config: ResourceConfig,
        policy: PermissionPolicy,
    ) -> Self {
        let table = TableState::new(TableOptions {
            page_size: config
                .page_size
                .unwrap_or_else(|| crate::config::config().ui.page_size),
            searchable: config.searchable(),
            default_ordering: config.default_ordering.clone(),
            row_key: default_row_key,
        });
        Self { config, client, store, policy, table }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    pub fn routes(&self) -> ResourceRoutes {
        ResourceRoutes { base: format!("/{}", self.config.plural) }
    }

    // --- list state ------------------------------------------------------

    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.table.refresh(&self.client, &self.config.endpoint).await
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.table.set_search(term);
    }

    /// Ordering keys go through the resource's allow-list; an unknown key is
    /// rejected rather than passed to the backend.
    pub fn set_ordering(&mut self, ordering: Option<String>) -> Result<(), ApiError> {
        if let Some(key) = &ordering {
            if !self.config.ordering_allowed(key) {
                return Err(ApiError::bad_request(format!(
                    "Ordering by '{}' is not supported for {}",
                    key, self.config.plural
                )));
            }
        }
        self.table.set_ordering(ordering);
        Ok(())
    }

    // --- single-entity operations ---------------------------------------

    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.client.get(&self.config.detail_path(id), &[]).await
    }

    /// Validate and POST. The list is refreshed on success so it reflects
    /// the mutation; on failure the error goes back to the caller untouched.
    pub async fn create(&mut self, values: &Map<String, Value>) -> Result<Value, ApiError> {
        validate_values(&self.config, values, false)
            .map_err(|field_errors| ApiError::validation("Validation failed", field_errors))?;

        let created = self
            .client
            .post(&self.config.endpoint, &Value::Object(values.clone()))
            .await?;
        tracing::info!(resource = %self.config.name, "created record");
        self.refresh_after_mutation().await;
        Ok(created)
    }

    /// Validate the supplied fields and PATCH.
    pub async fn update(&mut self, id: &str, values: &Map<String, Value>) -> Result<Value, ApiError> {
        validate_values(&self.config, values, true)
            .map_err(|field_errors| ApiError::validation("Validation failed", field_errors))?;

        let updated = self
            .client
            .patch(&self.config.detail_path(id), &Value::Object(values.clone()))
            .await?;
        tracing::info!(resource = %self.config.name, id, "updated record");
        self.refresh_after_mutation().await;
        Ok(updated)
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.config.detail_path(id)).await?;
        tracing::info!(resource = %self.config.name, id, "deleted record");
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// One DELETE per id, issued concurrently. Partial failure is reported
    /// per id; the list is refreshed regardless so surviving rows are shown.
    pub async fn remove_many(&mut self, ids: &[String]) -> BulkOutcome {
        let calls = ids.iter().map(|id| {
            let client = Arc::clone(&self.client);
            let path = self.config.detail_path(id);
            let id = id.clone();
            async move { (id, client.delete(&path).await) }
        });

        let mut outcome = BulkOutcome::default();
        for (id, result) in join_all(calls).await {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(err) => outcome.failed.push((id, err.message().to_string())),
            }
        }

        self.refresh_after_mutation().await;
        outcome
    }

    async fn refresh_after_mutation(&mut self) {
        if let Err(err) = self.refresh().await {
            // The mutation already succeeded; a failed refresh only leaves
            // the table with its own error message.
            tracing::warn!(resource = %self.config.name, "refresh after mutation failed: {}", err);
        }
    }

    // --- permissions -----------------------------------------------------

    pub fn can_create(&self) -> bool {
        self.permitted(self.config.permissions.create.clone())
    }

    pub fn can_view(&self) -> bool {
        self.permitted(self.config.permissions.view.clone())
    }

    pub fn can_update(&self) -> bool {
        self.permitted(self.config.permissions.update.clone())
    }

    pub fn can_delete(&self) -> bool {
        self.permitted(self.config.permissions.delete.clone())
    }

    /// Superusers pass unconditionally. Otherwise the verb's configured key
    /// is looked up in the user's permission set; a verb with no key falls
    /// under the configured policy (deny unless opted into `Allow`).
    fn permitted(&self, key: Option<String>) -> bool {
        let Ok(session) = self.store.load() else {
            return false;
        };
        if session.is_superuser() {
            return true;
        }
        match key {
            Some(key) => session
                .user
                .as_ref()
                .map(|u| u.has_permission(&key))
                .unwrap_or(false),
            None => self.policy == PermissionPolicy::Allow,
        }
    }
}
