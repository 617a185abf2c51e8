//! Flatten, compare and rebuild JSON/YAML localization trees
//!
//! A localization file is a tree of keys whose leaves are strings. This crate
//! turns such a tree into a flat list of leaf items, compares a base file with
//! an earlier translation, and writes edited items back into a copy of the
//! source tree.
//!
//! # Example
//!
//! ```ignore
//! use lingotree::{DocumentFormat, flatten, rebuild, Translatable};
//!
//! let doc = DocumentFormat::Json.parse(r#"{"menu": {"file": "File"}}"#)?;
//! let mut items = flatten(&doc);
//! items[0].apply_translation("文件".to_string());
//!
//! let updated = rebuild(&doc, &items)?;
//! println!("{}", DocumentFormat::Json.serialize(&updated)?);
//! ```

pub mod error;
pub mod flatten;
pub mod format;
pub mod item;
pub mod loader;
pub mod merge;
pub mod path;
pub mod rebuild;
pub mod selection;

#[cfg(test)]
mod test_support;

pub use error::{TreeError, TreeResult};
pub use flatten::flatten;
pub use format::{DocumentFormat, ExportMode, export_filename};
pub use item::{FlatItem, MergedItem, Translatable};
pub use loader::load_document;
pub use merge::{merge, reconcile};
pub use path::{KeyPath, Segment};
pub use rebuild::rebuild;
pub use selection::{
    TranslationStats, apply_translation, reset_edit, select_untranslated, toggle_select_all,
    toggle_selection,
};
