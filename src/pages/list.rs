//! Generic list page: renders any resource's rows as a table, driven by the
//! resource's column specs. No per-resource rendering code exists anywhere.

use serde_json::Value;

use crate::engine::{BulkOutcome, ResourceEngine};
use crate::error::ApiError;

/// `idle -> loading -> {ready | failed}`, re-entering `loading` on refresh,
/// search, sort, page or page-size change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

pub struct ListPage {
    engine: ResourceEngine,
    phase: ListPhase,
}

impl ListPage {
    pub fn new(engine: ResourceEngine) -> Self {
        Self { engine, phase: ListPhase::Idle }
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn engine(&self) -> &ResourceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ResourceEngine {
        &mut self.engine
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.phase = ListPhase::Loading;
        match self.engine.refresh().await {
            Ok(()) => {
                self.phase = ListPhase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = ListPhase::Failed;
                Err(err)
            }
        }
    }

    pub async fn search(&mut self, term: impl Into<String>) -> Result<(), ApiError> {
        self.engine.set_search(term);
        self.load().await
    }

    pub async fn sort(&mut self, ordering: Option<String>) -> Result<(), ApiError> {
        self.engine.set_ordering(ordering)?;
        self.load().await
    }

    pub async fn go_to_page(&mut self, page: u32) -> Result<(), ApiError> {
        self.engine.table_mut().set_page(page);
        self.load().await
    }

    pub async fn resize_page(&mut self, page_size: u32) -> Result<(), ApiError> {
        self.engine.table_mut().set_page_size(page_size);
        self.load().await
    }

    /// Delete every selected row after `confirm` approves the count.
    /// Selection is cleared only when every delete succeeded; on partial
    /// failure the survivors stay selected for a retry.
    pub async fn bulk_delete<F>(&mut self, confirm: F) -> Result<Option<BulkOutcome>, ApiError>
    where
        F: FnOnce(usize) -> bool,
    {
        let ids: Vec<String> = self
            .engine
            .table()
            .selected_rows()
            .iter()
            .filter_map(crate::table::default_row_key)
            .collect();

        if ids.is_empty() {
            return Ok(None);
        }
        if !confirm(ids.len()) {
            return Ok(None);
        }

        let outcome = self.engine.remove_many(&ids).await;
        if outcome.all_succeeded() {
            self.engine.table_mut().clear_selection();
        }
        self.phase = ListPhase::Ready;
        Ok(Some(outcome))
    }

    /// Text rendering of the current state: the configured columns, the rows
    /// of the current page, and a pagination footer. Hidden pagination when
    /// there is nothing to page through.
    pub fn render(&self) -> String {
        let table = self.engine.table();

        if let Some(message) = table.error() {
            return format!("Error: {}\n", message);
        }
        if self.phase == ListPhase::Loading {
            return "Loading...\n".to_string();
        }

        let columns = &self.engine.config().columns;
        let max_width = crate::config::config().ui.column_width;

        let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows().len());
        for row in table.rows() {
            grid.push(
                columns
                    .iter()
                    .map(|col| {
                        let cell = match col.render {
                            Some(render) => render(row),
                            None => default_cell(row, &col.field),
                        };
                        truncate(&cell, max_width)
                    })
                    .collect(),
            );
        }

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                grid.iter()
                    .map(|cells| cells[i].chars().count())
                    .chain(std::iter::once(col.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for (i, col) in columns.iter().enumerate() {
            out.push_str(&pad(&col.label, widths[i]));
            out.push_str("  ");
        }
        out.push('\n');
        for width in &widths {
            out.push_str(&"-".repeat(*width));
            out.push_str("  ");
        }
        out.push('\n');
        for cells in &grid {
            for (i, cell) in cells.iter().enumerate() {
                out.push_str(&pad(cell, widths[i]));
                out.push_str("  ");
            }
            out.push('\n');
        }

        match table.page_info() {
            Some(info) => {
                out.push_str(&format!(
                    "Showing {}-{} of {} (page {} of {})\n",
                    info.start_index, info.end_index, info.total_items, info.page, info.total_pages
                ));
            }
            None => out.push_str("No results.\n"),
        }

        out
    }
}

/// Default cell formatting: the backend's `<field>_display` label wins when
/// present (choice fields), then the raw value.
fn default_cell(row: &Value, field: &str) -> String {
    if let Some(display) = row.get(format!("{}_display", field)).and_then(Value::as_str) {
        return display.to_string();
    }
    match row.get(field) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}
