//! Fetch lifecycle and row selection for one list endpoint.
//!
//! Rows are replaced wholesale on every successful fetch; there is no
//! incremental merge. Each fetch carries a monotonic sequence number and a
//! completion for a superseded fetch is discarded, so the table always
//! reflects the most recent request's parameters.

use serde_json::Value;

use crate::api::{ApiClient, ListData};
use crate::error::ApiError;

use super::pagination::{PageInfo, PaginationState};

/// Extracts the identity of a row for selection purposes.
pub type RowKeyFn = fn(&Value) -> Option<String>;

/// Default row key: the `id` property, string or numeric.
pub fn default_row_key(row: &Value) -> Option<String> {
    match row.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub page_size: u32,
    /// Whether the resource declares searchable fields; without them the
    /// `search` param is never sent.
    pub searchable: bool,
    pub default_ordering: Option<String>,
    pub row_key: RowKeyFn,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: crate::config::config().ui.page_size,
            searchable: true,
            default_ordering: None,
            row_key: default_row_key,
        }
    }
}

/// Handle for one in-flight fetch: its sequence number and the query params
/// it was issued with.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub seq: u64,
    pub params: Vec<(String, String)>,
}

pub struct TableState {
    rows: Vec<Value>,
    loading: bool,
    error: Option<String>,
    selected: Vec<Value>,
    search: String,
    ordering: Option<String>,
    filters: Vec<(String, String)>,
    pagination: PaginationState,
    searchable: bool,
    row_key: RowKeyFn,
    seq: u64,
}

impl TableState {
    pub fn new(options: TableOptions) -> Self {
        Self {
            rows: Vec::new(),
            loading: false,
            error: None,
            selected: Vec::new(),
            search: String::new(),
            ordering: options.default_ordering,
            filters: Vec::new(),
            pagination: PaginationState::new(options.page_size),
            searchable: options.searchable,
            row_key: options.row_key,
            seq: 0,
        }
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total_items(&self) -> u64 {
        self.pagination.total_items()
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        self.pagination.page_info()
    }

    pub fn current_page(&self) -> u32 {
        self.pagination.current_page()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn ordering(&self) -> Option<&str> {
        self.ordering.as_deref()
    }

    // --- query state -----------------------------------------------------

    /// Changing the search term returns to page 1, so a freshly filtered
    /// result set never opens past its end.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search {
            self.search = term;
            self.pagination.set_page(1);
        }
    }

    pub fn set_ordering(&mut self, ordering: Option<String>) {
        self.ordering = ordering;
    }

    /// Static filters merged into every request. Replacing them resets to
    /// page 1, same as a search change.
    pub fn set_filters(&mut self, filters: Vec<(String, String)>) {
        if filters != self.filters {
            self.filters = filters;
            self.pagination.set_page(1);
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.pagination.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.pagination.set_page_size(page_size);
    }

    /// Query parameters for the next fetch: static filters, pagination, and
    /// `search`/`ordering` only when applicable.
    pub fn build_query(&self) -> Vec<(String, String)> {
        let mut params = self.filters.clone();
        params.push(("page".to_string(), self.pagination.current_page().to_string()));
        params.push(("page_size".to_string(), self.pagination.page_size().to_string()));

        let search = self.search.trim();
        if self.searchable && !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(ordering) = &self.ordering {
            params.push(("ordering".to_string(), ordering.clone()));
        }
        params
    }

    // --- fetch lifecycle -------------------------------------------------

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = true;
        self.seq += 1;
        FetchTicket { seq: self.seq, params: self.build_query() }
    }

    /// Apply a finished fetch. Returns `false` when the result belonged to a
    /// superseded request and was discarded; the newest fetch's completion
    /// is the one that ends the loading state.
    pub fn complete_fetch(&mut self, seq: u64, outcome: Result<ListData, &ApiError>) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, newest = self.seq, "discarding stale fetch result");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(data) => {
                self.pagination.set_total_items(data.total);
                self.rows = data.items;
                self.error = None;
                // Selection is scoped to loaded rows: keep only keys that
                // are still present.
                let row_key = self.row_key;
                let current_keys: Vec<Option<String>> = self.rows.iter().map(row_key).collect();
                self.selected.retain(|row| {
                    let key = row_key(row);
                    key.is_some() && current_keys.contains(&key)
                });
            }
            Err(err) => {
                self.rows.clear();
                self.pagination.set_total_items(0);
                self.selected.clear();
                self.error = Some(err.message().to_string());
            }
        }
        true
    }

    /// Issue one fetch against `endpoint` and apply its outcome.
    pub async fn refresh(&mut self, client: &ApiClient, endpoint: &str) -> Result<(), ApiError> {
        let ticket = self.begin_fetch();
        match client.get_list(endpoint, &ticket.params).await {
            Ok(data) => {
                self.complete_fetch(ticket.seq, Ok(data));
                Ok(())
            }
            Err(err) => {
                self.complete_fetch(ticket.seq, Err(&err));
                Err(err)
            }
        }
    }

    // --- selection -------------------------------------------------------

    fn key_of(&self, row: &Value) -> Option<String> {
        (self.row_key)(row)
    }

    pub fn is_selected(&self, row: &Value) -> bool {
        let key = self.key_of(row);
        key.is_some() && self.selected.iter().any(|r| self.key_of(r) == key)
    }

    /// Add or remove one row by key. Adding an already-selected key is a
    /// no-op; rows without a key are never selectable.
    pub fn select_row(&mut self, row: &Value, selected: bool) {
        let row_key = self.row_key;
        let Some(key) = row_key(row) else {
            return;
        };
        if selected {
            if !self.selected.iter().any(|r| row_key(r).as_deref() == Some(key.as_str())) {
                self.selected.push(row.clone());
            }
        } else {
            self.selected.retain(|r| row_key(r).as_deref() != Some(key.as_str()));
        }
    }

    /// Replace the selection with every row on the current page, or clear it.
    pub fn select_all(&mut self, selected: bool) {
        if selected {
            self.selected = self.rows.clone();
        } else {
            self.selected.clear();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_rows(&self) -> &[Value] {
        &self.selected
    }
}
