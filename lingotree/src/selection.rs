//! Bulk selection and edit helpers for item lists

use serde::Serialize;

use crate::item::Translatable;

/// Flip the selection of one item; out-of-range indexes are ignored
pub fn toggle_selection<T: Translatable>(items: &mut [T], index: usize) {
    if let Some(item) = items.get_mut(index) {
        let selected = item.is_selected();
        item.set_selected(!selected);
    }
}

/// Select everything, or clear the selection when everything is already selected
pub fn toggle_select_all<T: Translatable>(items: &mut [T]) {
    let all_selected = items.iter().all(Translatable::is_selected);
    for item in items.iter_mut() {
        item.set_selected(!all_selected);
    }
}

/// Select exactly the items that have no non-blank translation yet
pub fn select_untranslated<T: Translatable>(items: &mut [T]) {
    for item in items.iter_mut() {
        let untranslated = !item.is_translated();
        item.set_selected(untranslated);
    }
}

/// Store a translation on the item at `index`
pub fn apply_translation<T: Translatable>(items: &mut [T], index: usize, text: String) {
    if let Some(item) = items.get_mut(index) {
        item.apply_translation(text);
    }
}

pub fn reset_edit<T: Translatable>(items: &mut [T], index: usize) {
    if let Some(item) = items.get_mut(index) {
        item.clear_edit();
    }
}

/// Counters shown next to an item list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TranslationStats {
    pub total: usize,
    pub selected: usize,
    pub translated: usize,
    pub untranslated: usize,
}

impl TranslationStats {
    pub fn collect<T: Translatable>(items: &[T]) -> Self {
        let translated = items.iter().filter(|item| item.is_translated()).count();
        Self {
            total: items.len(),
            selected: items.iter().filter(|item| item.is_selected()).count(),
            translated,
            untranslated: items.len() - translated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::item::FlatItem;
    use serde_json::json;

    fn sample() -> Vec<FlatItem> {
        flatten(&json!({ "a": "x", "b": "y", "c": "z" }))
    }

    #[test]
    fn test_toggle_selection() {
        let mut items = sample();
        toggle_selection(&mut items, 1);
        assert!(items[1].selected);
        toggle_selection(&mut items, 1);
        assert!(!items[1].selected);

        // Out of range is a no-op
        toggle_selection(&mut items, 99);
    }

    #[test]
    fn test_toggle_select_all() {
        let mut items = sample();
        items[0].selected = true;

        toggle_select_all(&mut items);
        assert!(items.iter().all(|item| item.selected));

        toggle_select_all(&mut items);
        assert!(items.iter().all(|item| !item.selected));
    }

    #[test]
    fn test_select_untranslated() {
        let mut items = sample();
        apply_translation(&mut items, 0, "甲".to_string());
        apply_translation(&mut items, 1, " ".to_string());
        items[0].selected = true;

        select_untranslated(&mut items);
        assert!(!items[0].selected);
        assert!(items[1].selected);
        assert!(items[2].selected);
    }

    #[test]
    fn test_reset_edit() {
        let mut items = sample();
        apply_translation(&mut items, 2, "丙".to_string());
        reset_edit(&mut items, 2);
        assert!(items[2].edited.is_none());
    }

    #[test]
    fn test_stats() {
        let mut items = sample();
        apply_translation(&mut items, 0, "甲".to_string());
        items[1].selected = true;

        let stats = TranslationStats::collect(&items);
        assert_eq!(
            stats,
            TranslationStats {
                total: 3,
                selected: 1,
                translated: 1,
                untranslated: 2,
            }
        );
    }
}
