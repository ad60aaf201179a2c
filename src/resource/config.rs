use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative descriptor of one entity type: which endpoint serves it, how
/// its form fields and table columns look, and which permission codename
/// gates each CRUD verb. Authored once, immutable at runtime; the generic
/// list/form surfaces are driven entirely by this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub plural: String,
    /// Endpoint path relative to the API prefix, with trailing slash
    /// (`leads/`). Detail routes append `<id>/`.
    pub endpoint: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub permissions: PermissionKeys,
    /// Fields the backend searches; an empty list disables the search box.
    #[serde(default)]
    pub search_fields: Vec<String>,
    /// Fields accepted by the `ordering` query param, without direction.
    #[serde(default)]
    pub ordering_fields: Vec<String>,
    #[serde(default)]
    pub default_ordering: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl ResourceConfig {
    pub fn detail_path(&self, id: &str) -> String {
        format!("{}{}/", self.endpoint, id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn searchable(&self) -> bool {
        !self.search_fields.is_empty()
    }

    /// An ordering key is accepted with or without a leading `-`.
    pub fn ordering_allowed(&self, ordering: &str) -> bool {
        let key = ordering.strip_prefix('-').unwrap_or(ordering);
        self.ordering_fields.iter().any(|f| f == key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// For `Select` fields: the accepted values and their display labels.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl FieldSpec {
    pub fn choice_label(&self, value: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Phone,
    Textarea,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: &str, label: &str) -> Self {
        Self { value: value.to_string(), label: label.to_string() }
    }
}

/// One table column. `render` overrides the default cell formatting; it is
/// code-only and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    #[serde(skip)]
    pub render: Option<fn(&Value) -> String>,
}

impl ColumnSpec {
    pub fn new(field: &str, label: &str) -> Self {
        Self { field: field.to_string(), label: label.to_string(), render: None }
    }

    pub fn with_render(field: &str, label: &str, render: fn(&Value) -> String) -> Self {
        Self { field: field.to_string(), label: label.to_string(), render: Some(render) }
    }
}

/// Permission codename per CRUD verb. A missing key falls under the
/// configured [`PermissionPolicy`](crate::config::PermissionPolicy).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionKeys {
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

impl PermissionKeys {
    /// Django-style codenames: `app.add_model`, `app.view_model`, etc.
    pub fn django(app: &str, model: &str) -> Self {
        Self {
            create: Some(format!("{}.add_{}", app, model)),
            view: Some(format!("{}.view_{}", app, model)),
            update: Some(format!("{}.change_{}", app, model)),
            delete: Some(format!("{}.delete_{}", app, model)),
        }
    }
}
