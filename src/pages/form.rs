//! Generic create/edit form flow.
//!
//! `loading-existing (edit only) -> editing -> submitting -> done`; a failed
//! submit returns to `editing` with its field errors attached, matching the
//! error policy of the list page's sibling form view.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::engine::ResourceEngine;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    LoadingExisting,
    Editing,
    Submitting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

pub struct FormPage {
    engine: ResourceEngine,
    mode: FormMode,
    values: Map<String, Value>,
    field_errors: HashMap<String, String>,
    page_error: Option<String>,
    phase: FormPhase,
}

impl FormPage {
    pub fn create(engine: ResourceEngine) -> Self {
        Self {
            engine,
            mode: FormMode::Create,
            values: Map::new(),
            field_errors: HashMap::new(),
            page_error: None,
            phase: FormPhase::Editing,
        }
    }

    pub fn edit(engine: ResourceEngine, id: impl Into<String>) -> Self {
        Self {
            engine,
            mode: FormMode::Edit { id: id.into() },
            values: Map::new(),
            field_errors: HashMap::new(),
            page_error: None,
            phase: FormPhase::LoadingExisting,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn field_errors(&self) -> &HashMap<String, String> {
        &self.field_errors
    }

    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    pub fn engine(&self) -> &ResourceEngine {
        &self.engine
    }

    /// Fetch the record under edit and seed the form with its declared
    /// fields. A failed load keeps the page in `loading-existing` so the
    /// caller may retry.
    pub async fn load_existing(&mut self) -> Result<(), ApiError> {
        let FormMode::Edit { id } = self.mode.clone() else {
            self.phase = FormPhase::Editing;
            return Ok(());
        };

        match self.engine.get(&id).await {
            Ok(record) => {
                if let Value::Object(obj) = record {
                    self.values = obj
                        .into_iter()
                        .filter(|(name, _)| self.engine.config().field(name).is_some())
                        .collect();
                }
                self.page_error = None;
                self.phase = FormPhase::Editing;
                Ok(())
            }
            Err(err) => {
                self.page_error = Some(err.message().to_string());
                Err(err)
            }
        }
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Merge a batch of edits into the form.
    pub fn set_values(&mut self, values: Map<String, Value>) {
        for (name, value) in values {
            self.values.insert(name, value);
        }
    }

    /// Validate and submit. On success the page is `done` and the server's
    /// record is returned; on failure the page re-enters `editing` with the
    /// field errors (client- or server-reported) attached per field.
    pub async fn submit(&mut self) -> Result<Value, ApiError> {
        self.phase = FormPhase::Submitting;
        self.field_errors.clear();
        self.page_error = None;

        let result = match self.mode.clone() {
            FormMode::Create => self.engine.create(&self.values).await,
            FormMode::Edit { id } => self.engine.update(&id, &self.values).await,
        };

        match result {
            Ok(record) => {
                self.phase = FormPhase::Done;
                Ok(record)
            }
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.field_errors = fields.clone();
                } else {
                    self.page_error = Some(err.message().to_string());
                }
                self.phase = FormPhase::Editing;
                Err(err)
            }
        }
    }

    /// Text rendering: one line per declared field with its label, current
    /// value and, when present, the error attached to that field.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(message) = &self.page_error {
            out.push_str(&format!("Error: {}\n", message));
        }

        for field in &self.engine.config().fields {
            let value = match self.values.get(&field.name) {
                None | Some(Value::Null) => "-".to_string(),
                Some(Value::String(s)) => {
                    // Prefer the human label of a selected choice.
                    field.choice_label(s).unwrap_or(s).to_string()
                }
                Some(other) => other.to_string(),
            };
            out.push_str(&format!("{}: {}\n", field.label, value));
            if let Some(error) = self.field_errors.get(&field.name) {
                out.push_str(&format!("  ! {}\n", error));
            }
        }
        out
    }
}
