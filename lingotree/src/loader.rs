use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::format::DocumentFormat;

/// Load and parse a localization document from disk
///
/// When `format` is `None` it is inferred from the file extension, falling
/// back to JSON for unknown extensions.
///
/// # Errors
/// - File read errors
/// - Parse errors in the selected format
pub fn load_document(path: &Path, format: Option<DocumentFormat>) -> TreeResult<Value> {
    let format = format
        .or_else(|| DocumentFormat::from_path(path))
        .unwrap_or_default();

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), %format, bytes = content.len(), "Loaded document");

    format.parse(&content).map_err(|err| match err {
        TreeError::Parse { format, message } => TreeError::Parse {
            format,
            message: format!("{} ({})", message, path.display()),
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_load_infers_yaml_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "title: Hello").unwrap();

        let doc = load_document(file.path(), None).unwrap();
        assert_eq!(doc, json!({ "title": "Hello" }));
    }

    #[test]
    fn test_load_explicit_format_wins() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "title: Hello").unwrap();

        let doc = load_document(file.path(), Some(DocumentFormat::Yaml)).unwrap();
        assert_eq!(doc, json!({ "title": "Hello" }));
    }

    #[test]
    fn test_load_parse_error_names_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{ broken").unwrap();

        let err = load_document(file.path(), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid JSON"));
        assert!(msg.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(Path::new("/nonexistent/en.json"), None).unwrap_err();
        assert!(matches!(err, TreeError::Io(_)));
    }
}
