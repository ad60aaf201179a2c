use serde_json::Value;

/// Canonical list shape. Every list endpoint, whatever it returns on the
/// wire, is reduced to this at the network boundary; nothing past the client
/// ever sees the raw response shape.
#[derive(Debug, Clone, Default)]
pub struct ListData {
    pub items: Vec<Value>,
    pub total: u64,
}

/// Accepts the three shapes the backend's endpoints produce:
/// the DRF envelope `{count, next, previous, results}`, a bare array
/// (count = length), or a single object (a one-item result set).
pub fn normalize_list(body: Value) -> ListData {
    match body {
        Value::Object(mut obj) if obj.contains_key("results") => {
            let items = match obj.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let total = obj
                .get("count")
                .and_then(Value::as_u64)
                .unwrap_or(items.len() as u64);
            ListData { items, total }
        }
        Value::Array(items) => {
            let total = items.len() as u64;
            ListData { items, total }
        }
        Value::Null => ListData::default(),
        single => ListData { items: vec![single], total: 1 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_uses_count_over_page_length() {
        let body = json!({
            "count": 42,
            "next": "http://host/api/v1/leads/?page=2",
            "previous": null,
            "results": (0..25).map(|i| json!({"id": i})).collect::<Vec<_>>(),
        });
        let data = normalize_list(body);
        assert_eq!(data.total, 42);
        assert_eq!(data.items.len(), 25);
    }

    #[test]
    fn bare_array_counts_its_length() {
        let data = normalize_list(json!([{"id": 1}, {"id": 2}, {"id": 3}]));
        assert_eq!(data.total, 3);
        assert_eq!(data.items.len(), 3);
    }

    #[test]
    fn single_object_is_a_one_item_result() {
        let data = normalize_list(json!({"id": 1, "name": "only"}));
        assert_eq!(data.total, 1);
        assert_eq!(data.items[0]["name"], "only");
    }

    #[test]
    fn envelope_without_count_falls_back_to_length() {
        let data = normalize_list(json!({"results": [{"id": 1}]}));
        assert_eq!(data.total, 1);
    }

    #[test]
    fn null_body_is_empty() {
        let data = normalize_list(Value::Null);
        assert_eq!(data.total, 0);
        assert!(data.items.is_empty());
    }
}
