//! Markdown-to-HTML converters.

use crate::error::ConvertError;
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;

/// Something that turns Markdown text into HTML.
pub trait Converter: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str {
        "converter"
    }

    /// Render Markdown to an HTML string.
    fn to_html(&self, markdown: &str) -> Result<String, ConvertError>;
}

/// Options for the built-in converter.
///
/// All extensions are off by default, which gives plain CommonMark.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterOptions {
    /// GitHub-style tables.
    pub tables: bool,
    /// `[^1]` footnotes.
    pub footnotes: bool,
    /// `~~strikethrough~~`.
    pub strikethrough: bool,
    /// `- [x]` task list items.
    pub tasklists: bool,
    /// Curly quotes, dashes and ellipses.
    pub smart_punctuation: bool,
    /// `# Heading {#id .class}` attributes.
    pub heading_attributes: bool,
    /// Reject inputs longer than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl ConverterOptions {
    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

/// Converter backed by `pulldown-cmark`.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: ConverterOptions,
}

impl MarkdownConverter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }
}

impl Converter for MarkdownConverter {
    fn name(&self) -> &str {
        "pulldown-cmark"
    }

    fn to_html(&self, markdown: &str) -> Result<String, ConvertError> {
        if let Some(limit) = self.options.max_input_bytes {
            if markdown.len() > limit {
                return Err(ConvertError::InputTooLarge {
                    len: markdown.len(),
                    limit,
                });
            }
        }

        let parser = Parser::new_ext(markdown, self.options.parser_options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        Ok(output)
    }
}
