//! Deterministic unwrapping of heterogeneous tool-result payload shapes.

use serde_json::Value;

/// Wrapper keys probed, in order, for list-shaped content.
const LIST_KEYS: [&str; 3] = ["results", "items", "records"];

/// Extract the renderable content from an arbitrarily wrapped payload.
///
/// Applies a fixed precedence of known wrapper shapes; the first matching
/// rule wins. The most specific nested wrappers are tried before structural
/// heuristics, and anything unrecognized passes through unchanged:
///
/// 1. empty payload (`null`, `false`, `0`, `""`) becomes `null`
/// 2. `.message.template_data`
/// 3. `.message.response_content`
/// 4. `.data.results` / `.data.items` / `.data.records`
/// 5. top-level `.results` / `.items` / `.records`
/// 6. a `.rows` object that itself holds `.columns` and `.rows` is
///    un-nested one level (accidental double-wrapping of a table)
/// 7. a payload with `.columns`, or an array `.rows`, is already a table
///    and is returned as-is
/// 8. a bare array is wrapped into `{"rows": [...]}`
/// 9. anything else is returned unchanged
///
/// Never fails: any input produces some output.
pub fn normalize(payload: Value) -> Value {
    if is_empty(&payload) {
        return Value::Null;
    }

    for path in ["/message/template_data", "/message/response_content"] {
        if let Some(inner) = payload.pointer(path).filter(|v| !is_empty(v)) {
            return inner.clone();
        }
    }

    if let Some(data) = payload.get("data") {
        if let Some(inner) = first_list_member(data) {
            return inner.clone();
        }
    }
    if let Some(inner) = first_list_member(&payload) {
        return inner.clone();
    }

    if let Some(rows) = payload.get("rows") {
        if let Some(obj) = rows.as_object() {
            if obj.contains_key("columns") && obj.contains_key("rows") {
                return rows.clone();
            }
        }
    }

    let is_table = payload.get("columns").is_some()
        || payload.get("rows").is_some_and(Value::is_array);
    if is_table {
        return payload;
    }

    if payload.is_array() {
        let mut wrapped = serde_json::Map::with_capacity(1);
        wrapped.insert("rows".to_string(), payload);
        return Value::Object(wrapped);
    }

    payload
}

fn first_list_member(container: &Value) -> Option<&Value> {
    LIST_KEYS
        .iter()
        .find_map(|key| container.get(key).filter(|v| !is_empty(v)))
}

/// Empty per the host scripting environment's truthiness rules, restricted
/// to JSON-representable values.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payloads_become_null() {
        assert_eq!(normalize(Value::Null), Value::Null);
        assert_eq!(normalize(json!(false)), Value::Null);
        assert_eq!(normalize(json!(0)), Value::Null);
        assert_eq!(normalize(json!("")), Value::Null);
    }

    #[test]
    fn test_totality_over_scalars() {
        assert_eq!(normalize(json!(42)), json!(42));
        assert_eq!(normalize(json!("text")), json!("text"));
        assert_eq!(normalize(json!(true)), json!(true));
        assert_eq!(normalize(json!(-1.5)), json!(-1.5));
    }

    #[test]
    fn test_template_data_unwrapped() {
        let payload = json!({"message": {"template_data": {"a": 1}}});
        assert_eq!(normalize(payload), json!({"a": 1}));
    }

    #[test]
    fn test_template_data_wins_over_response_content() {
        let payload = json!({
            "message": {"template_data": {"a": 1}, "response_content": {"b": 2}}
        });
        assert_eq!(normalize(payload), json!({"a": 1}));
    }

    #[test]
    fn test_response_content_when_no_template_data() {
        let payload = json!({"message": {"response_content": {"b": 2}}});
        assert_eq!(normalize(payload), json!({"b": 2}));
    }

    #[test]
    fn test_data_wrapper_key_order() {
        let payload = json!({"data": {"records": [3], "items": [2], "results": [1]}});
        assert_eq!(normalize(payload), json!([1]));

        let payload = json!({"data": {"records": [3], "items": [2]}});
        assert_eq!(normalize(payload), json!([2]));
    }

    #[test]
    fn test_data_wrapper_wins_over_top_level() {
        let payload = json!({"data": {"items": [1]}, "items": [2]});
        assert_eq!(normalize(payload), json!([1]));
    }

    #[test]
    fn test_top_level_list_keys() {
        assert_eq!(normalize(json!({"results": [1, 2]})), json!([1, 2]));
        assert_eq!(
            normalize(json!({"items": [{"id": 1}, {"id": 2}]})),
            json!([{"id": 1}, {"id": 2}])
        );
        assert_eq!(normalize(json!({"records": ["r"]})), json!(["r"]));
    }

    #[test]
    fn test_double_wrapped_table_unnested() {
        let payload = json!({"rows": {"columns": ["x"], "rows": [[1]]}});
        assert_eq!(normalize(payload), json!({"columns": ["x"], "rows": [[1]]}));
    }

    #[test]
    fn test_canonical_table_unchanged() {
        let table = json!({"columns": ["a", "b"], "rows": [[1, 2], [3, 4]]});
        assert_eq!(normalize(table.clone()), table);
    }

    #[test]
    fn test_rows_only_table_unchanged() {
        let table = json!({"rows": [[1], [2]]});
        assert_eq!(normalize(table.clone()), table);
    }

    #[test]
    fn test_bare_array_wrapped_into_rows() {
        assert_eq!(normalize(json!([1, 2, 3])), json!({"rows": [1, 2, 3]}));
    }

    #[test]
    fn test_unrecognized_object_passes_through() {
        let payload = json!({"foo": 1, "bar": {"baz": 2}});
        assert_eq!(normalize(payload.clone()), payload);
    }

    #[test]
    fn test_single_pass_no_reapplication() {
        // Rule 5 extracts the array; the bare-array wrap of rule 8 is not
        // applied to the extracted value.
        assert_eq!(normalize(json!({"items": [1, 2]})), json!([1, 2]));
    }

    #[test]
    fn test_empty_wrapper_values_skipped() {
        // A null template_data does not shadow response_content.
        let payload = json!({
            "message": {"template_data": null, "response_content": {"b": 2}}
        });
        assert_eq!(normalize(payload), json!({"b": 2}));

        // A null results member does not shadow items.
        let payload = json!({"results": null, "items": [1]});
        assert_eq!(normalize(payload), json!([1]));
    }

    #[test]
    fn test_empty_array_is_still_content() {
        // Empty arrays are present content, not missing content.
        assert_eq!(normalize(json!({"items": []})), json!([]));
    }
}
