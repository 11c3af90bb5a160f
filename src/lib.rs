//! # data-markdown
//!
//! Render Markdown written inside HTML elements flagged with a
//! `data-markdown` attribute.
//!
//! ```html
//! <div data-markdown>
//!     # Release notes
//!     Markdown can be *indented* with the surrounding HTML.
//! </div>
//! ```
//!
//! Each marked element is read, de-indented so the HTML's indentation does
//! not change the Markdown's meaning, converted with `pulldown-cmark`, and has
//! its content replaced by the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use data_markdown::{render_page, Config};
//!
//! let page = "<div data-markdown>\n    # Hello\n    Some *text*.\n</div>";
//! let rendered = render_page(page, &Config::default()).unwrap();
//!
//! assert!(rendered.html.contains("<h1>Hello</h1>"));
//! assert!(rendered.report.is_clean());
//! ```
//!
//! ## Lazy Converter Loading
//!
//! A [`ConverterLoader`] starts without a converter and requests a converter
//! profile (TOML, see [`ConverterOptions`]) from a [`ConverterSource`] the
//! first time a pass runs:
//!
//! ```rust,no_run
//! use data_markdown::{Config, ConverterLoader, FileSource, HtmlDocument};
//!
//! let config = Config::default();
//! let mut loader = ConverterLoader::from_config(&config);
//! let mut doc = HtmlDocument::parse("<div data-markdown># Hi</div>");
//!
//! let report = loader
//!     .ensure_converter_then_run(&FileSource::new("site"), &mut doc, &config)
//!     .unwrap();
//! println!("{} rendered", report.rendered());
//! ```
//!
//! ## Failure Isolation
//!
//! A conversion error on one element is recorded in the [`PassReport`] and the
//! element is left as it was; the other elements are still rendered.
//!
//! ## Known Limitations
//!
//! The pass is not idempotent: the marker attribute is kept, so running it
//! again feeds the rendered HTML back into the converter.
//!
//! ## FFI
//!
//! A C-compatible interface is available on non-WASM targets, see [`ffi`].
//!
//! ## Features
//!
//! - `wasm`: WebAssembly bindings that render the live browser document

pub mod config;
pub mod converter;
pub mod document;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod transform;

// FFI module (only for non-WASM builds)
#[cfg(not(target_arch = "wasm32"))]
pub mod ffi;

// WASM module (only with feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Convenience re-exports
pub use config::{Config, ContentSource, DEFAULT_MARKER_ATTRIBUTE, DEFAULT_RESOURCE_PATH};
pub use converter::{Converter, ConverterOptions, MarkdownConverter};
pub use document::{Document, HtmlDocument};
pub use error::{ConfigError, ConvertError, Error, LoadError, Result};
pub use loader::{
    BuiltinSource, ConverterLoader, ConverterSource, FileSource, LoadRequest, LoadState, PageConverter,
};
pub use normalize::{normalize_indentation, normalize_with};
pub use transform::{transform, ElementOutcome, PassReport};

/// A page after a rendering pass.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The serialized page.
    pub html: String,
    /// Per-element results.
    pub report: PassReport,
}

/// Render every marked element of an HTML page in one step.
///
/// The converter is built from `config.converter`; no load request is made.
pub fn render_page(html: &str, config: &Config) -> Result<RenderedPage> {
    config.validate()?;

    let converter = MarkdownConverter::new(config.converter.clone());
    let mut document = HtmlDocument::parse(html);
    let report = transform(&mut document, &converter, config)?;

    Ok(RenderedPage {
        html: document.to_html(),
        report,
    })
}

/// De-indent and convert a single Markdown snippet.
///
/// # Example
///
/// ```rust
/// use data_markdown::{render_markdown, ConverterOptions};
///
/// let html = render_markdown("\n    # Hello\n", &ConverterOptions::default()).unwrap();
/// assert_eq!(html, "<h1>Hello</h1>\n");
/// ```
pub fn render_markdown(input: &str, options: &ConverterOptions) -> Result<String> {
    let markdown = normalize_indentation(input);
    let html = MarkdownConverter::new(options.clone()).to_html(&markdown)?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_page() {
        let input = r#"<!DOCTYPE html>
<html>
<head><title>Notes</title></head>
<body>
  <article data-markdown>
    # Release notes

    - faster *startup*
    - fewer `allocations`
  </article>
  <p>Plain paragraph.</p>
</body>
</html>"#;

        let page = render_page(input, &Config::default()).unwrap();

        assert!(page.report.is_clean());
        assert_eq!(page.report.rendered(), 1);
        assert!(page.html.contains("<h1>Release notes</h1>"));
        assert!(page.html.contains("<li>faster <em>startup</em></li>"));
        assert!(page.html.contains("<code>allocations</code>"));
        assert!(page.html.contains("<p>Plain paragraph.</p>"));
        assert!(page.html.contains("<title>Notes</title>"));
    }

    #[test]
    fn test_fragment_page() {
        let page = render_page(
            "<div data-markdown>\n    # Title\n    Body text\n</div>",
            &Config::default(),
        )
        .unwrap();

        assert_eq!(
            page.html,
            "<div data-markdown=\"\"><h1>Title</h1>\n<p>Body text</p>\n</div>"
        );
    }

    #[test]
    fn test_page_with_leading_comment_keeps_structure() {
        let input = "<!-- build 42 --><!DOCTYPE html><html><head><title>T</title></head>\
                     <body><div data-markdown># Hi</div></body></html>";
        let page = render_page(input, &Config::default()).unwrap();

        assert!(page.html.starts_with("<!-- build 42 --><!DOCTYPE html><html>"));
        assert!(page.html.contains("<head><title>T</title></head>"));
        assert!(page.html.contains("<body><div data-markdown=\"\"><h1>Hi</h1>\n</div></body>"));
    }

    #[test]
    fn test_page_with_byte_order_mark_keeps_structure() {
        let input = "\u{feff}<!DOCTYPE html><html><head><title>T</title></head>\
                     <body><div data-markdown># Hi</div></body></html>";
        let page = render_page(input, &Config::default()).unwrap();

        assert!(page.html.contains("<html>"));
        assert!(page.html.contains("<head><title>T</title></head>"));
        assert!(page.html.contains("<body><div data-markdown=\"\"><h1>Hi</h1>\n</div></body>"));
    }

    #[test]
    fn test_page_without_markers() {
        let page = render_page("<p>static</p>", &Config::default()).unwrap();
        assert!(page.report.is_empty());
        assert_eq!(page.html, "<p>static</p>");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            marker_attribute: String::new(),
            ..Default::default()
        };
        let err = render_page("<p></p>", &config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidMarker(_))));
    }

    #[test]
    fn test_render_markdown_snippet() {
        let html = render_markdown(
            "\n        Some **bold** text\n        ",
            &ConverterOptions::default(),
        )
        .unwrap();
        assert_eq!(html, "<p>Some <strong>bold</strong> text</p>\n");
    }

    #[test]
    fn test_render_markdown_limit() {
        let options = ConverterOptions {
            max_input_bytes: Some(1),
            ..Default::default()
        };
        let err = render_markdown("# too long", &options).unwrap_err();
        assert!(matches!(err, Error::Convert(ConvertError::InputTooLarge { .. })));
    }
}
