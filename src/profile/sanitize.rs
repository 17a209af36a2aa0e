//! Argument sanitization
//!
//! Entry-function arguments are arbitrarily nested JSON. Address-like hex
//! strings (`0x...`) carry no human-readable meaning, so they are removed
//! along with any arrays left empty by the removal.

use serde_json::Value;

/// Prefix marking an address or object identifier
const HEX_PREFIX: &str = "0x";

/// Sanitize a single argument value.
///
/// Returns `None` when the value should be dropped by the caller.
pub fn sanitize(value: &Value) -> Option<Value> {
    match value {
        Value::Array(items) => Some(Value::Array(sanitize_arguments(items))),
        Value::String(s) if s.starts_with(HEX_PREFIX) => None,
        other => Some(other.clone()),
    }
}

/// Sanitize an argument list, dropping removed values and empty arrays
pub fn sanitize_arguments(values: &[Value]) -> Vec<Value> {
    values
        .iter()
        .filter_map(sanitize)
        .filter(|v| !matches!(v, Value::Array(items) if items.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_hex_strings() {
        let args = vec![json!("0xabc"), json!("bob"), json!("100")];
        assert_eq!(sanitize_arguments(&args), vec![json!("bob"), json!("100")]);
    }

    #[test]
    fn test_drops_arrays_emptied_by_sanitization() {
        let args = vec![json!(["0x1", "0x2"]), json!([]), json!(["keep", ["0x3"]])];
        assert_eq!(sanitize_arguments(&args), vec![json!(["keep"])]);
    }

    #[test]
    fn test_non_string_scalars_pass_through() {
        let args = vec![json!(42), json!(true), json!(null), json!({"inner": "0xdead"})];
        assert_eq!(sanitize_arguments(&args), args);
    }

    #[test]
    fn test_top_level_values() {
        assert_eq!(sanitize(&json!("0x1::aptos_coin::AptosCoin")), None);
        assert_eq!(sanitize(&json!("hello")), Some(json!("hello")));
        // A bare empty array is kept at the top level; only elements are pruned.
        assert_eq!(sanitize(&json!([])), Some(json!([])));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(sanitize(&json!("0Xabc")), Some(json!("0Xabc")));
    }

    #[test]
    fn test_idempotent() {
        let args = vec![
            json!("0xfeed"),
            json!(["a", ["0xb", ["c", []]], "0xd"]),
            json!(7),
            json!([["0x1"]]),
            json!("name"),
        ];
        let once = sanitize_arguments(&args);
        let twice = sanitize_arguments(&once);
        assert_eq!(once, twice);
        assert_eq!(once, vec![json!(["a", [["c"]]]), json!(7), json!("name")]);
    }
}
