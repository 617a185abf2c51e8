//! Extraction of every translatable leaf string from a document tree

use serde_json::Value;

use crate::item::FlatItem;
use crate::path::KeyPath;

/// Walk `document` depth-first and collect one [`FlatItem`] per string leaf.
///
/// Mappings are visited in key order and sequences in index order, so the
/// output is stable for a given document. Numbers, booleans and nulls are not
/// part of the translatable surface and produce nothing.
pub fn flatten(document: &Value) -> Vec<FlatItem> {
    let mut items = Vec::new();
    collect_leaves(document, KeyPath::root(), &mut items);
    items
}

fn collect_leaves(node: &Value, path: KeyPath, items: &mut Vec<FlatItem>) {
    match node {
        Value::String(text) => items.push(FlatItem::new(path, text.as_str())),
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(child, path.child_key(key), items);
            }
        }
        Value::Array(elements) => {
            for (index, child) in elements.iter().enumerate() {
                collect_leaves(child, path.child_index(index), items);
            }
        }
        Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}
