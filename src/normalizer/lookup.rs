//! Null-safe lookups into untyped upstream JSON.
//!
//! Every helper degrades to `None` on a missing key, a `null`, or a node of the
//! wrong type, so chained lookups never fail on a partial payload.

use serde_json::Value;

/// A key path into a JSON object, outermost key first.
pub type Path = &'static [&'static str];

/// Walks `path` from `raw`.
pub fn at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |node, key| node.get(*key))
}

/// Whether an upstream value counts as supplied.
///
/// Upstreams use `null`, `""`, `0` and `false` interchangeably for "no data",
/// so all of them are treated as absent. Arrays and objects are always present,
/// even when empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Value at `path`, if present.
pub fn present<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    at(raw, path).filter(|value| is_present(value))
}

/// Renders a scalar as text; objects unwrap their `descricao` member.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => map
            .get("descricao")
            .filter(|inner| is_present(inner))
            .and_then(as_text),
        _ => None,
    }
}

/// Text at `path`, if present.
pub fn text(raw: &Value, path: &[&str]) -> Option<String> {
    present(raw, path).and_then(as_text)
}

/// First present array among `paths`.
pub fn first_array<'a>(raw: &'a Value, paths: &[Path]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .find_map(|path| present(raw, path).and_then(Value::as_array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_survives_missing_intermediate() {
        let raw = json!({ "estabelecimento": null, "cidade": "x" });
        assert!(at(&raw, &["estabelecimento", "cidade", "nome"]).is_none());
        assert!(at(&raw, &["cidade", "nome"]).is_none());
        assert!(at(&json!([1, 2]), &["a"]).is_none());
    }

    #[test]
    fn test_presence() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(false)));
        assert!(is_present(&json!([])));
        assert!(is_present(&json!({})));
        assert!(is_present(&json!("0")));
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&json!(3550308)), Some("3550308".to_string()));
        assert_eq!(
            as_text(&json!({ "id": "05", "descricao": "Demais" })),
            Some("Demais".to_string())
        );
        assert_eq!(as_text(&json!({ "id": "05" })), None);
        assert_eq!(as_text(&json!("")), None);
    }
}
