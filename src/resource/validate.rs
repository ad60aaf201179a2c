//! Client-side form validation derived from field specs.
//!
//! The first violated rule per field wins; later rules for the same field
//! are not evaluated, so the user sees one message per input.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::config::{FieldKind, FieldSpec, ResourceConfig};

/// Validate submitted values against the resource's field specs.
///
/// `partial` is true for PATCH updates: absent fields are skipped instead of
/// failing the required check.
pub fn validate_values(
    config: &ResourceConfig,
    values: &Map<String, Value>,
    partial: bool,
) -> Result<(), HashMap<String, String>> {
    let mut errors = HashMap::new();

    for field in &config.fields {
        if let Some(message) = validate_field(field, values.get(&field.name), partial) {
            errors.insert(field.name.clone(), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_field(field: &FieldSpec, value: Option<&Value>, partial: bool) -> Option<String> {
    let present = value.map(|v| !is_blank(v)).unwrap_or(false);

    if !present {
        if field.required && !partial && value.map(is_blank).unwrap_or(true) {
            return Some(format!("{} é obrigatório", field.label));
        }
        // Optional and absent: nothing further to check.
        if value.is_none() {
            return None;
        }
        // Explicitly blank on a partial update still fails required.
        if field.required && partial {
            return Some(format!("{} é obrigatório", field.label));
        }
        return None;
    }

    let value = value.expect("present value");

    match field.kind {
        FieldKind::Email => {
            let text = value.as_str().unwrap_or_default();
            if !looks_like_email(text) {
                return Some("Informe um email válido".to_string());
            }
        }
        FieldKind::Select => {
            let text = value.as_str().unwrap_or_default();
            if !field.choices.iter().any(|c| c.value == text) {
                return Some(format!("Valor inválido para {}", field.label));
            }
        }
        FieldKind::Checkbox => {
            if !value.is_boolean() {
                return Some(format!("{} deve ser verdadeiro ou falso", field.label));
            }
        }
        FieldKind::Text | FieldKind::Phone | FieldKind::Textarea => {}
    }

    if let Some(max) = field.max_length {
        let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
        if len > max {
            return Some(format!("{} deve ter no máximo {} caracteres", field.label, max));
        }
    }

    None
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Cheap structural check, mirroring what the original form layer did; the
/// backend remains the authority on address validity.
fn looks_like_email(text: &str) -> bool {
    let mut parts = text.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        _ => false,
    }
}
