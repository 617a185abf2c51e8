//! Machine translation support for lingotree
//!
//! This crate sends the leaf strings of a localization tree to an
//! OpenAI-compatible chat-completions endpoint, a bounded number at a time,
//! and hands each translation back as soon as it arrives.
//!
//! # Workflow Example
//!
//! ```ignore
//! use lingotree::{DocumentFormat, flatten, rebuild, toggle_select_all};
//! use lingotree_mt::{BatchTranslator, FileConfigStore, ConfigStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Parse and flatten the source document
//!     let doc = DocumentFormat::Json.parse(r#"{"menu": {"file": "File", "edit": "Edit"}}"#)?;
//!     let mut items = flatten(&doc);
//!     toggle_select_all(&mut items);
//!
//!     // 2. Load the persisted endpoint settings
//!     let config = FileConfigStore::default_location()?.load()?;
//!
//!     // 3. Translate the selected items
//!     let runner = BatchTranslator::new();
//!     let mut results = Vec::new();
//!     runner.run(&config, &items, |index, text| results.push((index, text))).await?;
//!     for (index, text) in results {
//!         lingotree::apply_translation(&mut items, index, text);
//!     }
//!
//!     // 4. Write the translations back into the tree
//!     println!("{}", DocumentFormat::Json.serialize(&rebuild(&doc, &items)?)?);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod chat_completion;
pub mod config;
pub mod error;
pub mod mock;
pub mod translator;

pub use batch::{BatchReport, BatchTranslator};
pub use chat_completion::ChatCompletionProvider;
pub use config::{
    ConfigStore, DEFAULT_PROMPT_TEMPLATE, FileConfigStore, MemoryConfigStore, TranslationConfig,
    update_config,
};
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockStats, MockTranslator};
pub use translator::MachineTranslator;
