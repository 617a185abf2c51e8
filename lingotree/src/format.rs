//! JSON and YAML reading and writing for localization documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{TreeError, TreeResult};

/// Text format of a localization document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Parse `text` into a document tree
    pub fn parse(&self, text: &str) -> TreeResult<Value> {
        match self {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| TreeError::parse(*self, e.to_string()))
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| TreeError::parse(*self, e.to_string()))
            }
        }
    }

    /// Like [`parse`](Self::parse), but blank input means "no document"
    pub fn parse_optional(&self, text: &str) -> TreeResult<Option<Value>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.parse(text).map(Some)
    }

    /// Render a document; JSON is pretty-printed with a two-space indent
    pub fn serialize(&self, document: &Value) -> TreeResult<String> {
        let rendered = match self {
            DocumentFormat::Json => {
                serde_json::to_string_pretty(document).map_err(|e| e.to_string())
            }
            DocumentFormat::Yaml => serde_yaml::to_string(document).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| TreeError::Serialize {
            format: *self,
            message,
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "application/json",
            DocumentFormat::Yaml => "text/yaml",
        }
    }

    /// Guess the format from a file extension (`.json`, `.yaml`, `.yml`)
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "JSON"),
            DocumentFormat::Yaml => write!(f, "YAML"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            other => Err(format!("Unknown document format: {}", other)),
        }
    }
}

/// Which workflow produced an exported document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Fresh translation of a single document
    Initial,
    /// Base document refreshed against an earlier translation
    Update,
}

impl ExportMode {
    fn file_prefix(&self) -> &'static str {
        match self {
            ExportMode::Initial => "translated",
            ExportMode::Update => "updated_translation",
        }
    }
}

/// Download name such as `translated_1718000000000.json`
pub fn export_filename(mode: ExportMode, format: DocumentFormat, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        mode.file_prefix(),
        at.timestamp_millis(),
        format.extension()
    )
}
