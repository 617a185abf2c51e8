//! Write edited leaf strings back into a copy of the source document

use serde_json::Value;
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::item::Translatable;
use crate::path::{KeyPath, Segment};

/// Produce a new document with each item's final value written at its path.
///
/// `original` is never modified. Items whose [`Translatable::final_value`]
/// is `None`, or equals what the document already holds, are skipped.
///
/// # Errors
///
/// [`TreeError::PathResolution`] when a path walks through a node that is not
/// a mapping or sequence, or when the root path targets a document that is
/// not a bare string. That means the item list was not flattened from this
/// document.
pub fn rebuild<T: Translatable>(original: &Value, items: &[T]) -> TreeResult<Value> {
    let mut document = original.clone();
    let mut written = 0usize;

    for item in items {
        let Some(value) = item.final_value() else {
            continue;
        };
        if write_leaf(&mut document, item.path(), value)? {
            written += 1;
        }
    }

    debug!(written, total = items.len(), "Rebuilt document");
    Ok(document)
}

/// Assign `value` at `path`, returning whether the document changed
fn write_leaf(document: &mut Value, path: &KeyPath, value: &str) -> TreeResult<bool> {
    let Some((parents, last)) = path.split_last() else {
        // Only a bare string document is addressed by the root path
        return match document {
            Value::String(current) if current == value => Ok(false),
            Value::String(_) => {
                *document = Value::String(value.to_string());
                Ok(true)
            }
            _ => Err(TreeError::path_resolution(path)),
        };
    };

    let mut node = document;
    for segment in parents {
        node = child_mut(node, segment).ok_or_else(|| TreeError::path_resolution(path))?;
    }

    let slot = match node {
        Value::Object(map) => map.entry(last.as_key()).or_insert(Value::Null),
        Value::Array(elements) => last
            .as_index()
            .and_then(|index| elements.get_mut(index))
            .ok_or_else(|| TreeError::path_resolution(path))?,
        _ => return Err(TreeError::path_resolution(path)),
    };

    if slot.as_str() == Some(value) {
        return Ok(false);
    }
    *slot = Value::String(value.to_string());
    Ok(true)
}

fn child_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(&segment.as_key()),
        Value::Array(elements) => segment.as_index().and_then(|index| elements.get_mut(index)),
        _ => None,
    }
}
