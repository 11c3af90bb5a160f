//! Page configuration, loaded from TOML.
//!
//! ```toml
//! marker_attribute = "data-markdown"
//! content = "inner-html"
//! collapse_blank_lines = true
//! resource_path = "data-markdown.toml"
//!
//! [converter]
//! tables = true
//! ```

use crate::converter::ConverterOptions;
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::Path;

/// Attribute flagging elements whose content is Markdown.
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-markdown";

/// Relative path of the converter profile requested by the loader.
pub const DEFAULT_RESOURCE_PATH: &str = "data-markdown.toml";

/// How the raw content of a marked element is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentSource {
    /// Decoded text content; child tags are dropped.
    Text,
    /// Serialized inner HTML, the way the browser's `innerHTML` reads it.
    /// Inline HTML passes through to the converter.
    #[default]
    InnerHtml,
}

/// Configuration for a rendering pass over a page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Attribute whose presence marks an element for rendering.
    pub marker_attribute: String,
    /// Which representation of the element's content is fed to the converter.
    pub content: ContentSource,
    /// Whether whitespace-only lines are collapsed before de-indenting.
    pub collapse_blank_lines: bool,
    /// Converter profile path requested when the converter is not loaded yet.
    pub resource_path: String,
    /// Options used when the converter is built up front.
    pub converter: ConverterOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            content: ContentSource::InnerHtml,
            collapse_blank_lines: true,
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            converter: ConverterOptions::default(),
        }
    }
}

impl Config {
    /// Parse and validate a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|e| ConfigError::InvalidToml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check that the marker attribute can be used as an attribute selector.
    pub fn validate(&self) -> Result<()> {
        validate_marker(&self.marker_attribute)?;
        Ok(())
    }

    /// The attribute-presence selector for marked elements.
    pub fn selector(&self) -> String {
        format!("[{}]", self.marker_attribute)
    }
}

/// Attribute names are restricted to ASCII letters, digits, `-`, `_` and `:`,
/// and must start with a letter.
pub(crate) fn validate_marker(marker: &str) -> std::result::Result<(), ConfigError> {
    let mut chars = marker.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidMarker(marker.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.marker_attribute, "data-markdown");
        assert_eq!(config.content, ContentSource::InnerHtml);
        assert!(config.collapse_blank_lines);
        assert_eq!(config.resource_path, "data-markdown.toml");
        assert_eq!(config.selector(), "[data-markdown]");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r#"
marker_attribute = "data-md"
content = "text"
collapse_blank_lines = false
resource_path = "assets/converter.toml"

[converter]
tables = true
max_input_bytes = 4096
"#,
        )
        .unwrap();

        assert_eq!(config.marker_attribute, "data-md");
        assert_eq!(config.content, ContentSource::Text);
        assert!(!config.collapse_blank_lines);
        assert_eq!(config.resource_path, "assets/converter.toml");
        assert!(config.converter.tables);
        assert_eq!(config.converter.max_input_bytes, Some(4096));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str("marker = \"data-md\"").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn test_invalid_marker() {
        for marker in ["", "1abc", "data markdown", "x]", "data-\"md"] {
            assert!(validate_marker(marker).is_err(), "{marker:?} should be rejected");
        }
        for marker in ["data-markdown", "md", "x:markdown", "data_md2"] {
            assert!(validate_marker(marker).is_ok(), "{marker:?} should be accepted");
        }

        let err = Config::from_toml_str("marker_attribute = \"a b\"").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidMarker(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.toml");
        std::fs::write(&path, "collapse_blank_lines = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.collapse_blank_lines);

        let missing = Config::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }
}
