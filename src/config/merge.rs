//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively. Arrays and scalars from the higher tier replace
//! the lower tier's value. A `null` in the higher tier means "not set".

use serde_json::Value;

/// Merge `overlay` onto `base`, with `overlay` winning on conflicts.
///
/// # Example
/// ```
/// use serde_json::json;
/// use todo_assist::config::deep_merge;
///
/// let defaults = json!({ "server": { "host": "127.0.0.1", "port": 4000 } });
/// let project = json!({ "server": { "port": 8080 } });
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({ "server": { "host": "127.0.0.1", "port": 8080 } })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge() {
        let defaults = json!({
            "server": {"host": "127.0.0.1", "port": 4000},
            "ai": {"model": "gemini-1.5-flash", "timeout_secs": 60}
        });
        let user = json!({"ai": {"timeout_secs": 10}});
        assert_eq!(
            deep_merge(defaults, user),
            json!({
                "server": {"host": "127.0.0.1", "port": 4000},
                "ai": {"model": "gemini-1.5-flash", "timeout_secs": 10}
            })
        );
    }

    #[test]
    fn test_null_keeps_lower_tier() {
        let base = json!({"storage": {"key": "todos"}});
        let overlay = json!({"storage": {"key": null}});
        assert_eq!(deep_merge(base, overlay), json!({"storage": {"key": "todos"}}));
    }

    #[test]
    fn test_arrays_are_replaced() {
        let base = json!({"list": ["a", "b"]});
        let overlay = json!({"list": ["c"]});
        assert_eq!(deep_merge(base, overlay), json!({"list": ["c"]}));
    }

    #[test]
    fn test_merge_all_later_wins() {
        let tiers = vec![
            json!({"server": {"port": 4000}}),
            json!({"server": {"port": 5000, "host": "0.0.0.0"}}),
            json!({"server": {"port": 6000}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"server": {"port": 6000, "host": "0.0.0.0"}})
        );
    }

    #[test]
    fn test_scalar_and_object_replace_each_other() {
        assert_eq!(
            deep_merge(json!({"v": 1}), json!({"v": {"x": true}})),
            json!({"v": {"x": true}})
        );
        assert_eq!(deep_merge(json!({"v": {"x": true}}), json!({"v": 1})), json!({"v": 1}));
    }
}
