//! Item types produced by flattening and merging
//!
//! A [`FlatItem`] is the atomic unit of selection and translation in the
//! initial workflow; a [`MergedItem`] carries the extra comparison state used
//! by the update workflow. Both implement [`Translatable`] so the batch runner
//! and the rebuilder can work with either list.

use serde::{Deserialize, Serialize};

use crate::path::KeyPath;

/// One leaf string of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatItem {
    pub path: KeyPath,
    /// Original string content at `path`
    pub value: String,
    #[serde(default)]
    pub selected: bool,
    /// Override applied by the user or by machine translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<String>,
}

impl FlatItem {
    pub fn new(path: KeyPath, value: impl Into<String>) -> Self {
        Self {
            path,
            value: value.into(),
            selected: false,
            edited: None,
        }
    }
}

/// A base-document leaf annotated against a previously translated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedItem {
    pub path: KeyPath,
    /// String from the base document
    pub original_value: String,
    /// String found at the same path in the translated document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_value: Option<String>,
    /// Value shown to the user: the last edit, else the translation, else the original
    pub current_value: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_updated: bool,
}

impl MergedItem {
    /// Item with no counterpart in the translated document
    pub fn new_entry(path: KeyPath, original_value: String) -> Self {
        Self {
            path,
            current_value: original_value.clone(),
            original_value,
            translated_value: None,
            selected: false,
            edited: None,
            is_new: true,
            is_updated: false,
        }
    }

    /// Item that exists in both documents
    pub fn with_translation(path: KeyPath, original_value: String, translated: String) -> Self {
        let is_updated = translated != original_value;
        Self {
            path,
            original_value,
            current_value: translated.clone(),
            translated_value: Some(translated),
            selected: false,
            edited: None,
            is_new: false,
            is_updated,
        }
    }

    /// Whether the item still needs attention in an update pass
    pub fn needs_translation(&self) -> bool {
        self.is_new || self.is_updated
    }
}

/// Common view over item kinds used by translation and rebuilding
pub trait Translatable {
    fn path(&self) -> &KeyPath;

    /// Text sent for translation; never a previous edit
    fn source_text(&self) -> &str;

    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);

    fn edited(&self) -> Option<&str>;

    /// Record a manual or machine translation
    fn apply_translation(&mut self, text: String);

    /// Drop any override and go back to the unedited state
    fn clear_edit(&mut self);

    /// Value the rebuilder writes at `path`, or `None` to leave the node untouched
    fn final_value(&self) -> Option<&str>;

    /// An item counts as translated once it carries a non-blank edit
    fn is_translated(&self) -> bool {
        self.edited().is_some_and(|text| !text.trim().is_empty())
    }
}

impl Translatable for FlatItem {
    fn path(&self) -> &KeyPath {
        &self.path
    }

    fn source_text(&self) -> &str {
        &self.value
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn edited(&self) -> Option<&str> {
        self.edited.as_deref()
    }

    fn apply_translation(&mut self, text: String) {
        self.edited = Some(text);
    }

    fn clear_edit(&mut self) {
        self.edited = None;
    }

    fn final_value(&self) -> Option<&str> {
        self.edited.as_deref()
    }
}

impl Translatable for MergedItem {
    fn path(&self) -> &KeyPath {
        &self.path
    }

    fn source_text(&self) -> &str {
        &self.original_value
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn edited(&self) -> Option<&str> {
        self.edited.as_deref()
    }

    fn apply_translation(&mut self, text: String) {
        self.current_value = text.clone();
        self.edited = Some(text);
    }

    fn clear_edit(&mut self) {
        self.edited = None;
        self.current_value = self
            .translated_value
            .clone()
            .unwrap_or_else(|| self.original_value.clone());
    }

    fn final_value(&self) -> Option<&str> {
        Some(self.edited.as_deref().unwrap_or(&self.current_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_item_final_value_only_when_edited() {
        let mut item = FlatItem::new(KeyPath::parse_dotted("a"), "Hello");
        assert_eq!(item.final_value(), None);

        item.apply_translation("你好".to_string());
        assert_eq!(item.final_value(), Some("你好"));
        assert!(item.is_translated());

        item.clear_edit();
        assert_eq!(item.final_value(), None);
    }

    #[test]
    fn test_blank_edit_is_not_translated() {
        let mut item = FlatItem::new(KeyPath::parse_dotted("a"), "Hello");
        item.apply_translation("   ".to_string());
        assert!(!item.is_translated());
    }

    #[test]
    fn test_merged_item_flags_are_exclusive() {
        let fresh = MergedItem::new_entry(KeyPath::parse_dotted("a"), "x".to_string());
        assert!(fresh.is_new && !fresh.is_updated);
        assert!(fresh.translated_value.is_none());

        let changed =
            MergedItem::with_translation(KeyPath::parse_dotted("a"), "x".into(), "X".into());
        assert!(!changed.is_new && changed.is_updated);

        let same = MergedItem::with_translation(KeyPath::parse_dotted("a"), "x".into(), "x".into());
        assert!(!same.is_new && !same.is_updated);
        assert!(!same.needs_translation());
    }

    #[test]
    fn test_merged_item_translation_updates_current_value() {
        let mut item =
            MergedItem::with_translation(KeyPath::parse_dotted("a"), "x".into(), "X".into());
        item.apply_translation("Z".to_string());
        assert_eq!(item.current_value, "Z");
        assert_eq!(item.final_value(), Some("Z"));

        item.clear_edit();
        assert_eq!(item.current_value, "X");
        assert_eq!(item.final_value(), Some("X"));
    }

    #[test]
    fn test_merged_item_source_text_is_original() {
        let mut item =
            MergedItem::with_translation(KeyPath::parse_dotted("a"), "x".into(), "X".into());
        item.apply_translation("edited".to_string());
        assert_eq!(item.source_text(), "x");
    }

    #[test]
    fn test_merged_item_camel_case_wire_shape() {
        let item = MergedItem::new_entry(KeyPath::parse_dotted("nav.home"), "Home".to_string());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["path"], serde_json::json!(["nav", "home"]));
        assert_eq!(json["originalValue"], "Home");
        assert_eq!(json["currentValue"], "Home");
        assert_eq!(json["isNew"], true);
        assert!(json.get("translatedValue").is_none());
    }
}
