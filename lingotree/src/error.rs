use thiserror::Error;

use crate::format::DocumentFormat;
use crate::path::KeyPath;

/// Errors raised while parsing, walking or serializing a localization tree
#[derive(Debug, Error)]
pub enum TreeError {
    /// Input text is not a valid document in the selected format
    #[error("Invalid {format}: {message}")]
    Parse {
        format: DocumentFormat,
        message: String,
    },

    /// A flattened path does not resolve in the document being rebuilt.
    ///
    /// The item list and the document are out of sync when this happens.
    #[error("Path '{path}' does not resolve to a container in the document")]
    PathResolution { path: KeyPath },

    /// Document could not be written back out
    #[error("Failed to serialize {format}: {message}")]
    Serialize {
        format: DocumentFormat,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    pub fn parse(format: DocumentFormat, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }

    pub fn path_resolution(path: &KeyPath) -> Self {
        Self::PathResolution { path: path.clone() }
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_format() {
        let err = TreeError::parse(DocumentFormat::Yaml, "mapping values are not allowed");
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid YAML: "));
        assert!(msg.contains("mapping values"));
    }

    #[test]
    fn test_path_resolution_error_shows_dotted_path() {
        let path = KeyPath::parse_dotted("menu.file.open");
        let err = TreeError::path_resolution(&path);
        assert!(err.to_string().contains("menu.file.open"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TreeError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }
}
