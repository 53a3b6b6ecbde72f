//! Legacy option key translation
//!
//! Older configurations used snake_case keys and a `propWhiteList`. They are
//! renamed to their current names before options are deserialized.

use serde_json::{Map, Value};

/// Old key -> current key, applied in this order
pub const LEGACY_KEYS: [(&str, &str); 6] = [
    ("root_value", "rootValue"),
    ("unit_precision", "unitPrecision"),
    ("selector_black_list", "selectorBlackList"),
    ("prop_white_list", "propList"),
    ("media_query", "mediaQuery"),
    ("propWhiteList", "propList"),
];

const WHITE_LIST_KEYS: [&str; 2] = ["prop_white_list", "propWhiteList"];

fn is_empty_list(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Rename legacy keys in place.
///
/// An empty legacy white list used to mean "every property", so when one is
/// present and `propList` is not, `propList` becomes `["*"]`. A legacy key
/// overwrites the current key if both are present.
pub fn normalize_legacy_keys(map: &mut Map<String, Value>) {
    let empty_white_list = WHITE_LIST_KEYS.iter().any(|key| is_empty_list(map.get(*key)));

    if empty_white_list && !map.contains_key("propList") {
        map.insert("propList".to_string(), Value::Array(vec![Value::from("*")]));
        for key in WHITE_LIST_KEYS {
            map.remove(key);
        }
    }

    for (old, new) in LEGACY_KEYS {
        if let Some(value) = map.remove(old) {
            map.insert(new.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(value: Value) -> Value {
        let Value::Object(mut map) = value else { panic!("expected object") };
        normalize_legacy_keys(&mut map);
        Value::Object(map)
    }

    #[test]
    fn test_renames() {
        let out = normalized(json!({
            "root_value": 10,
            "unit_precision": 3,
            "selector_black_list": ["a"],
            "media_query": true,
            "unit": "em"
        }));
        assert_eq!(
            out,
            json!({
                "rootValue": 10,
                "unitPrecision": 3,
                "selectorBlackList": ["a"],
                "mediaQuery": true,
                "unit": "em"
            })
        );
    }

    #[test]
    fn test_white_list_becomes_prop_list() {
        assert_eq!(normalized(json!({"prop_white_list": ["font"]})), json!({"propList": ["font"]}));
        assert_eq!(normalized(json!({"propWhiteList": ["margin"]})), json!({"propList": ["margin"]}));
    }

    #[test]
    fn test_empty_white_list_means_everything() {
        assert_eq!(normalized(json!({"prop_white_list": []})), json!({"propList": ["*"]}));
        assert_eq!(normalized(json!({"propWhiteList": []})), json!({"propList": ["*"]}));
    }

    #[test]
    fn test_empty_white_list_with_prop_list() {
        // propList already set: the empty legacy list is renamed over it
        let out = normalized(json!({"propWhiteList": [], "propList": ["font"]}));
        assert_eq!(out, json!({"propList": []}));
    }

    #[test]
    fn test_legacy_key_wins() {
        let out = normalized(json!({"rootValue": 16, "root_value": 20}));
        assert_eq!(out, json!({"rootValue": 20}));
    }

    #[test]
    fn test_later_alias_wins() {
        let out = normalized(json!({"prop_white_list": ["a"], "propWhiteList": ["b"]}));
        assert_eq!(out, json!({"propList": ["b"]}));
    }
}
