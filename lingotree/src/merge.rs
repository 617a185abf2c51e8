//! Comparison of a base document against an earlier translation
//!
//! The base document defines the shape: the merged list has exactly one item
//! per base leaf string, in base order. The translated document is only
//! consulted to carry existing translations forward; paths that exist only in
//! it are dropped.

use serde_json::Value;
use std::collections::HashMap;

use crate::flatten::flatten;
use crate::item::MergedItem;
use crate::path::KeyPath;

/// Annotate every leaf of `base` as new, updated or unchanged.
///
/// Pure and idempotent. Each call builds a fresh list with nothing selected
/// and no edits; use [`reconcile`] to keep user state from a previous list.
pub fn merge(base: &Value, translated: Option<&Value>) -> Vec<MergedItem> {
    let base_items = flatten(base);

    let Some(translated) = translated else {
        return base_items
            .into_iter()
            .map(|item| MergedItem::new_entry(item.path, item.value))
            .collect();
    };

    let mut lookup: HashMap<KeyPath, String> = flatten(translated)
        .into_iter()
        .map(|item| (item.path, item.value))
        .collect();

    base_items
        .into_iter()
        .map(|item| match lookup.remove(&item.path) {
            Some(existing) => MergedItem::with_translation(item.path, item.value, existing),
            None => MergedItem::new_entry(item.path, item.value),
        })
        .collect()
}

/// Carry selection and edits from `previous` into a freshly merged list.
///
/// State is kept only for paths whose base string is unchanged; an item whose
/// source text moved on starts clean so a stale translation is never kept.
pub fn reconcile(previous: &[MergedItem], fresh: Vec<MergedItem>) -> Vec<MergedItem> {
    let earlier: HashMap<&KeyPath, &MergedItem> =
        previous.iter().map(|item| (&item.path, item)).collect();

    fresh
        .into_iter()
        .map(|mut item| {
            if let Some(old) = earlier.get(&item.path) {
                if old.original_value == item.original_value {
                    item.selected = old.selected;
                    if let Some(edit) = &old.edited {
                        item.current_value = edit.clone();
                        item.edited = Some(edit.clone());
                    }
                }
            }
            item
        })
        .collect()
}
