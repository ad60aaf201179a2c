//! Built-in resource catalog plus YAML-defined custom resources.
//!
//! The built-ins mirror the backend's admin surface: leads, users and
//! companies. Deployments add their own entities by dropping YAML resource
//! files into `<config dir>/resources/`.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::config::{Choice, ColumnSpec, FieldKind, FieldSpec, PermissionKeys, ResourceConfig};

pub fn builtin() -> Vec<ResourceConfig> {
    vec![leads(), users(), companies()]
}

/// Look up a resource by singular or plural name, built-ins first, then any
/// YAML definitions under the config directory.
pub fn find(name: &str) -> Option<ResourceConfig> {
    let wanted = name.trim().to_ascii_lowercase();
    builtin()
        .into_iter()
        .chain(load_custom().into_iter())
        .find(|r| r.name == wanted || r.plural == wanted)
}

pub fn all() -> Vec<ResourceConfig> {
    let mut resources = builtin();
    resources.extend(load_custom());
    resources
}

fn load_custom() -> Vec<ResourceConfig> {
    let Ok(dir) = crate::session::get_config_dir() else {
        return Vec::new();
    };
    load_dir(&dir.join("resources"))
}

/// Parse every `.yaml`/`.yml` file in `dir` as one resource definition.
/// Unreadable files are skipped with a warning; a bad file must not take the
/// whole console down.
pub fn load_dir(dir: &Path) -> Vec<ResourceConfig> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut resources = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if !is_yaml {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str::<ResourceConfig>(&content) {
                Ok(resource) => resources.push(resource),
                Err(e) => tracing::warn!("skipping resource file {}: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("failed to read resource file {}: {}", path.display(), e),
        }
    }
    resources.sort_by(|a, b| a.name.cmp(&b.name));
    resources
}

fn leads() -> ResourceConfig {
    ResourceConfig {
        name: "lead".to_string(),
        plural: "leads".to_string(),
        endpoint: "leads/".to_string(),
        fields: vec![
            FieldSpec {
                name: "name".to_string(),
                label: "Nome".to_string(),
                kind: FieldKind::Text,
                required: true,
                max_length: Some(255),
                choices: vec![],
            },
            FieldSpec {
                name: "email".to_string(),
                label: "Email".to_string(),
                kind: FieldKind::Email,
                required: true,
                max_length: None,
                choices: vec![],
            },
            FieldSpec {
                name: "phone".to_string(),
                label: "Telefone".to_string(),
                kind: FieldKind::Phone,
                required: false,
                max_length: Some(20),
                choices: vec![],
            },
            FieldSpec {
                name: "client_company".to_string(),
                label: "Empresa do Cliente".to_string(),
                kind: FieldKind::Text,
                required: false,
                max_length: Some(255),
                choices: vec![],
            },
            FieldSpec {
                name: "status".to_string(),
                label: "Status".to_string(),
                kind: FieldKind::Select,
                required: false,
                max_length: None,
                choices: vec![
                    Choice::new("new", "Novo"),
                    Choice::new("contacted", "Contactado"),
                    Choice::new("qualified", "Qualificado"),
                    Choice::new("converted", "Convertido"),
                    Choice::new("lost", "Perdido"),
                ],
            },
            FieldSpec {
                name: "notes".to_string(),
                label: "Observações".to_string(),
                kind: FieldKind::Textarea,
                required: false,
                max_length: None,
                choices: vec![],
            },
            FieldSpec {
                name: "source".to_string(),
                label: "Origem".to_string(),
                kind: FieldKind::Text,
                required: false,
                max_length: Some(100),
                choices: vec![],
            },
        ],
        columns: vec![
            ColumnSpec::new("name", "Nome"),
            ColumnSpec::new("email", "Email"),
            ColumnSpec::new("client_company", "Empresa do Cliente"),
            ColumnSpec::new("status", "Status"),
            ColumnSpec::new("source", "Origem"),
            ColumnSpec::with_render("created_at", "Criado em", render_date),
        ],
        permissions: PermissionKeys::django("leads", "lead"),
        search_fields: vec![
            "name".to_string(),
            "email".to_string(),
            "client_company".to_string(),
        ],
        ordering_fields: vec![
            "name".to_string(),
            "status".to_string(),
            "created_at".to_string(),
        ],
        default_ordering: Some("-created_at".to_string()),
        page_size: None,
    }
}

fn users() -> ResourceConfig {
    ResourceConfig {
        name: "user".to_string(),
        plural: "users".to_string(),
        endpoint: "users/".to_string(),
        fields: vec![
            FieldSpec {
                name: "email".to_string(),
                label: "Email".to_string(),
                kind: FieldKind::Email,
                required: true,
                max_length: None,
                choices: vec![],
            },
            FieldSpec {
                name: "first_name".to_string(),
                label: "Nome".to_string(),
                kind: FieldKind::Text,
                required: false,
                max_length: Some(150),
                choices: vec![],
            },
            FieldSpec {
                name: "last_name".to_string(),
                label: "Sobrenome".to_string(),
                kind: FieldKind::Text,
                required: false,
                max_length: Some(150),
                choices: vec![],
            },
            FieldSpec {
                name: "is_active".to_string(),
                label: "Ativo".to_string(),
                kind: FieldKind::Checkbox,
                required: false,
                max_length: None,
                choices: vec![],
            },
        ],
        columns: vec![
            ColumnSpec::new("email", "Email"),
            ColumnSpec::new("first_name", "Nome"),
            ColumnSpec::new("last_name", "Sobrenome"),
            ColumnSpec::with_render("is_active", "Ativo", render_bool),
        ],
        permissions: PermissionKeys::django("accounts", "user"),
        search_fields: vec![
            "email".to_string(),
            "first_name".to_string(),
            "last_name".to_string(),
        ],
        ordering_fields: vec!["email".to_string(), "created_at".to_string()],
        default_ordering: Some("email".to_string()),
        page_size: None,
    }
}

fn companies() -> ResourceConfig {
    ResourceConfig {
        name: "company".to_string(),
        plural: "companies".to_string(),
        endpoint: "companies/".to_string(),
        fields: vec![
            FieldSpec {
                name: "name".to_string(),
                label: "Nome".to_string(),
                kind: FieldKind::Text,
                required: true,
                max_length: Some(255),
                choices: vec![],
            },
            FieldSpec {
                name: "slug".to_string(),
                label: "Slug".to_string(),
                kind: FieldKind::Text,
                required: true,
                max_length: Some(50),
                choices: vec![],
            },
            FieldSpec {
                name: "email".to_string(),
                label: "E-mail de Contato".to_string(),
                kind: FieldKind::Email,
                required: false,
                max_length: None,
                choices: vec![],
            },
            FieldSpec {
                name: "phone".to_string(),
                label: "Telefone".to_string(),
                kind: FieldKind::Phone,
                required: false,
                max_length: Some(20),
                choices: vec![],
            },
            FieldSpec {
                name: "is_active".to_string(),
                label: "Ativo".to_string(),
                kind: FieldKind::Checkbox,
                required: false,
                max_length: None,
                choices: vec![],
            },
        ],
        columns: vec![
            ColumnSpec::new("name", "Nome"),
            ColumnSpec::new("slug", "Slug"),
            ColumnSpec::with_render("is_active", "Ativo", render_bool),
        ],
        permissions: PermissionKeys::django("accounts", "company"),
        search_fields: vec!["name".to_string(), "slug".to_string()],
        ordering_fields: vec!["name".to_string()],
        default_ordering: Some("name".to_string()),
        page_size: None,
    }
}

/// Render callbacks receive the whole row.
fn render_date(row: &Value) -> String {
    row.get("created_at")
        .and_then(Value::as_str)
        .map(|s| s.split('T').next().unwrap_or(s).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_bool(row: &Value) -> String {
    match row.get("is_active").and_then(Value::as_bool) {
        Some(true) => "sim".to_string(),
        Some(false) => "não".to_string(),
        None => "-".to_string(),
    }
}
