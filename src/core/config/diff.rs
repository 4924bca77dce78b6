use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stands in for the side of a difference where the key does not exist.
pub const ABSENT_PLACEHOLDER: &str = "<absent>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    ValueMismatch,
    MissingInUploaded,
    MissingInServer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDifference {
    /// Dotted path of the differing key.
    pub key: String,
    pub server: Value,
    pub uploaded: Value,
    pub kind: DifferenceKind,
}

/// Lists the differences between an uploaded settings document and the
/// server's. Keys are visited in lexicographic order per level, depth
/// first; objects present on both sides are compared recursively.
pub fn compare_settings(uploaded: &Value, server: &Value) -> Vec<SettingsDifference> {
    let mut differences = Vec::new();
    match (uploaded, server) {
        (Value::Object(uploaded), Value::Object(server)) => {
            compare_objects("", uploaded, server, &mut differences);
        }
        _ if uploaded != server => differences.push(SettingsDifference {
            key: String::new(),
            server: server.clone(),
            uploaded: uploaded.clone(),
            kind: DifferenceKind::ValueMismatch,
        }),
        _ => {}
    }
    differences
}

fn compare_objects(
    prefix: &str,
    uploaded: &Map<String, Value>,
    server: &Map<String, Value>,
    differences: &mut Vec<SettingsDifference>,
) {
    let keys: BTreeSet<&String> = uploaded.keys().chain(server.keys()).collect();

    for key in keys {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match (uploaded.get(key), server.get(key)) {
            (Some(Value::Object(up)), Some(Value::Object(srv))) => {
                compare_objects(&path, up, srv, differences);
            }
            (Some(up), Some(srv)) => {
                if up != srv {
                    differences.push(SettingsDifference {
                        key: path,
                        server: srv.clone(),
                        uploaded: up.clone(),
                        kind: DifferenceKind::ValueMismatch,
                    });
                }
            }
            (Some(up), None) => differences.push(SettingsDifference {
                key: path,
                server: Value::String(ABSENT_PLACEHOLDER.to_string()),
                uploaded: up.clone(),
                kind: DifferenceKind::MissingInServer,
            }),
            (None, Some(srv)) => differences.push(SettingsDifference {
                key: path,
                server: srv.clone(),
                uploaded: Value::String(ABSENT_PLACEHOLDER.to_string()),
                kind: DifferenceKind::MissingInUploaded,
            }),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_documents_have_no_differences() {
        let doc = json!({
            "ll_model": { "temperature": 0.5, "model": null },
            "rag": { "top_k": 4 },
            "list": [1, 2, 3]
        });
        assert!(compare_settings(&doc, &doc).is_empty());
    }

    #[test]
    fn scalar_mismatch_reports_both_values() {
        let differences = compare_settings(&json!({"a": 1}), &json!({"a": 2}));
        assert_eq!(
            differences,
            vec![SettingsDifference {
                key: "a".to_string(),
                server: json!(2),
                uploaded: json!(1),
                kind: DifferenceKind::ValueMismatch,
            }]
        );
    }

    #[test]
    fn one_sided_keys_use_placeholder() {
        let differences = compare_settings(&json!({"only_up": true}), &json!({"only_srv": 3}));

        assert_eq!(differences.len(), 2);
        assert_eq!(differences[0].key, "only_srv");
        assert_eq!(differences[0].uploaded, json!(ABSENT_PLACEHOLDER));
        assert_eq!(differences[0].kind, DifferenceKind::MissingInUploaded);
        assert_eq!(differences[1].key, "only_up");
        assert_eq!(differences[1].server, json!(ABSENT_PLACEHOLDER));
        assert_eq!(differences[1].kind, DifferenceKind::MissingInServer);
    }

    #[test]
    fn nested_objects_recurse_depth_first_in_key_order() {
        let uploaded = json!({
            "z": 1,
            "rag": { "top_k": 8, "enabled": true, "extra": {"x": 1} },
            "a": { "b": { "c": "up" } }
        });
        let server = json!({
            "z": 1,
            "rag": { "top_k": 4, "enabled": true, "extra": 5 },
            "a": { "b": { "c": "srv" } }
        });

        let keys: Vec<String> = compare_settings(&uploaded, &server)
            .into_iter()
            .map(|difference| difference.key)
            .collect();

        assert_eq!(keys, vec!["a.b.c", "rag.extra", "rag.top_k"]);
    }

    #[test]
    fn object_versus_scalar_is_a_leaf_mismatch() {
        let differences = compare_settings(&json!({"k": {"x": 1}}), &json!({"k": 1}));
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].uploaded, json!({"x": 1}));
        assert_eq!(differences[0].server, json!(1));
    }
}
