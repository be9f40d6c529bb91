//! Applying `path -> 0|1` projections to stored documents.

use crate::core::types::RawDocument;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct PathTree {
    children: BTreeMap<String, PathTree>,
    leaf: bool,
}

impl PathTree {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('.') {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.leaf = true;
    }
}

fn flag(path: &str, value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => Err(format!("Unsupported projection option: {path}: {value}")),
    }
}

/// Project `document` through `projection`.
///
/// `_id` is kept unless explicitly excluded. Mixing inclusion and exclusion
/// on other paths is an error.
pub fn apply(document: &RawDocument, projection: &RawDocument) -> Result<RawDocument, String> {
    let mut keep_id = true;
    let mut included = PathTree::default();
    let mut excluded = PathTree::default();
    let mut inclusive = false;
    let mut exclusive = false;

    for (path, value) in projection {
        let wanted = flag(path, value)?;
        if path == "_id" {
            keep_id = wanted;
            continue;
        }
        if wanted {
            inclusive = true;
            included.insert(path);
        } else {
            exclusive = true;
            excluded.insert(path);
        }
    }

    if inclusive && exclusive {
        return Err("Projection cannot have a mix of inclusion and exclusion.".to_string());
    }

    let mut projected = if inclusive {
        include(document, &included)
    } else {
        exclude(document, &excluded)
    };

    if inclusive && keep_id {
        if let Some(id) = document.get("_id") {
            let mut with_id = RawDocument::new();
            with_id.insert("_id".to_string(), id.clone());
            with_id.extend(projected);
            projected = with_id;
        }
    }
    if !keep_id {
        projected = projected.into_iter().filter(|(key, _)| key != "_id").collect();
    }

    Ok(projected)
}

fn include(document: &RawDocument, tree: &PathTree) -> RawDocument {
    let mut projected = RawDocument::new();
    for (key, value) in document {
        let Some(node) = tree.children.get(key) else {
            continue;
        };
        if node.leaf {
            projected.insert(key.clone(), value.clone());
            continue;
        }
        match value {
            Value::Object(fields) => {
                projected.insert(key.clone(), Value::Object(include(fields, node)));
            }
            Value::Array(items) => {
                let items = items
                    .iter()
                    .filter_map(|item| item.as_object())
                    .map(|fields| Value::Object(include(fields, node)))
                    .collect();
                projected.insert(key.clone(), Value::Array(items));
            }
            _ => {}
        }
    }
    projected
}

fn exclude(document: &RawDocument, tree: &PathTree) -> RawDocument {
    let mut projected = RawDocument::new();
    for (key, value) in document {
        let Some(node) = tree.children.get(key) else {
            projected.insert(key.clone(), value.clone());
            continue;
        };
        if node.leaf {
            continue;
        }
        let value = match value {
            Value::Object(fields) => Value::Object(exclude(fields, node)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => Value::Object(exclude(fields, node)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        projected.insert(key.clone(), value);
    }
    projected
}
