//! YAML output: render a projected document with serde_yaml.
//!
//! The projection is already YAML shaped, so the mapping is direct:
//!   - Value::Null     -> YAML null
//!   - Value::Bool     -> YAML bool
//!   - Value::Integer  -> YAML integer (as a string when beyond i64/u64)
//!   - Value::Float    -> YAML float
//!   - Value::String   -> YAML string
//!   - Value::Array    -> YAML sequence
//!   - Value::Object   -> YAML mapping, in source order

use libminyaml::Value;
use num_traits::ToPrimitive;
use serde_yaml::{Mapping, Number};

/// Encode a projected value as YAML text.
pub fn encode(value: &Value) -> Result<String, String> {
    serde_yaml::to_string(&to_yaml(value)).map_err(|e| format!("YAML encode error: {}", e))
}

fn to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Integer(n) => match (n.to_i64(), n.to_u64()) {
            (Some(i), _) => serde_yaml::Value::Number(Number::from(i)),
            (None, Some(u)) => serde_yaml::Value::Number(Number::from(u)),
            (None, None) => serde_yaml::Value::String(n.to_string()),
        },
        Value::Float(f) => serde_yaml::Value::Number(Number::from(*f)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(items) => serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect()),
        Value::Object(entries) => {
            let mut map = Mapping::new();
            for (key, item) in entries {
                map.insert(serde_yaml::Value::String(key.clone()), to_yaml(item));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libminyaml::{parse, ValueError};

    #[test]
    fn test_keeps_source_order() {
        let doc = parse("zeta : 1\nalpha : on\nlist : [a, b]\n").unwrap();
        let value = Value::from_node(&doc, doc.root().unwrap()).unwrap();
        assert_eq!(
            encode(&value).unwrap(),
            "zeta: 1\nalpha: true\nlist:\n- a\n- b\n"
        );
    }

    #[test]
    fn test_duplicate_keys_never_reach_the_encoder() {
        let doc = parse("size : 8\nsize : 16\n").unwrap();
        let err = Value::from_node(&doc, doc.root().unwrap()).unwrap_err();
        assert_eq!(err, ValueError::DuplicateKey("size".to_string()));

        let doc = parse("size : 8\n").unwrap();
        let value = Value::from_node(&doc, doc.root().unwrap()).unwrap();
        assert_eq!(encode(&value).unwrap(), "size: 8\n");
    }

    #[test]
    fn test_huge_integer_becomes_string() {
        let doc = parse("big : 0xFFFFFFFFFFFFFFFFFF\n").unwrap();
        let value = Value::from_node(&doc, doc.root().unwrap()).unwrap();
        assert_eq!(encode(&value).unwrap(), "big: '4722366482869645213695'\n");
    }
}
