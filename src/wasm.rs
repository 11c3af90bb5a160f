//! WebAssembly bindings for the browser.
//!
//! Loading the module renders every `data-markdown` element of the current
//! page once. The pass can be re-run with other options:
//!
//! ```javascript
//! import init, { renderPage, renderMarkdown, PageOptions } from '@data-markdown/wasm';
//!
//! await init(); // renders the page with default options
//!
//! const options = new PageOptions();
//! options.setMarkerAttribute('data-md');
//! const summary = renderPage(options);
//! console.log(summary.rendered, summary.failures);
//!
//! const html = renderMarkdown('\n    # Hello\n');
//! ```

#![cfg(feature = "wasm")]

use crate::config::{validate_marker, Config, ContentSource, DEFAULT_RESOURCE_PATH};
use crate::converter::ConverterOptions;
use crate::document::Document;
use crate::error::{ConfigError, LoadError, Result};
use crate::loader::PageConverter;
use crate::normalize::normalize_indentation;
use crate::transform::PassReport;
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

thread_local! {
    static CONVERTER: RefCell<PageConverter> =
        RefCell::new(PageConverter::new(DEFAULT_RESOURCE_PATH));
}

// Initialize panic hook and render the page once
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if web_sys::window().and_then(|w| w.document()).is_some() {
        if let Err(error) = render_document(&Config::default()) {
            tracing::warn!(%error, "initial rendering pass failed");
        }
    }
}

// ============================================================================
// Main API Functions
// ============================================================================

/// Render every marked element of the current page.
///
/// Returns a summary object: `{ elements, rendered, failures: [{ index, message }] }`.
#[wasm_bindgen(js_name = renderPage)]
pub fn render_page(options: Option<PageOptions>) -> std::result::Result<JsValue, JsError> {
    let config = options.unwrap_or_default().to_config();
    let report = render_document(&config).map_err(|e| JsError::new(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&PageSummary::from(&report))
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// De-indent and render a Markdown snippet.
#[wasm_bindgen(js_name = renderMarkdown)]
pub fn render_markdown(
    input: &str,
    options: Option<PageOptions>,
) -> std::result::Result<String, JsError> {
    let converter = options.unwrap_or_default().converter;
    crate::render_markdown(input, &converter).map_err(|e| JsError::new(&e.to_string()))
}

/// Remove the shared indentation from embedded Markdown.
#[wasm_bindgen(js_name = normalizeIndentation)]
pub fn normalize(input: &str) -> String {
    normalize_indentation(input)
}

/// Get the library version.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn render_document(config: &Config) -> Result<PassReport> {
    config.validate()?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(LoadError::NoDocument)?;
    let mut page = DomDocument { document };

    CONVERTER.with(|converter| converter.borrow_mut().render(&mut page, config))
}

// ============================================================================
// Options
// ============================================================================

/// Options for a rendering pass.
#[wasm_bindgen]
pub struct PageOptions {
    marker_attribute: String,
    content: ContentSource,
    collapse_blank_lines: bool,
    converter: ConverterOptions,
}

#[wasm_bindgen]
impl PageOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = Config::default();
        Self {
            marker_attribute: config.marker_attribute,
            content: config.content,
            collapse_blank_lines: config.collapse_blank_lines,
            converter: config.converter,
        }
    }

    #[wasm_bindgen(js_name = setMarkerAttribute)]
    pub fn set_marker_attribute(&mut self, marker: &str) {
        self.marker_attribute = marker.to_string();
    }

    /// Read `innerHTML` (the default) or, when `false`, the text content.
    #[wasm_bindgen(js_name = setInnerHtml)]
    pub fn set_inner_html(&mut self, inner_html: bool) {
        self.content = if inner_html {
            ContentSource::InnerHtml
        } else {
            ContentSource::Text
        };
    }

    #[wasm_bindgen(js_name = setCollapseBlankLines)]
    pub fn set_collapse_blank_lines(&mut self, collapse: bool) {
        self.collapse_blank_lines = collapse;
    }

    #[wasm_bindgen(js_name = setTables)]
    pub fn set_tables(&mut self, enabled: bool) {
        self.converter.tables = enabled;
    }

    #[wasm_bindgen(js_name = setFootnotes)]
    pub fn set_footnotes(&mut self, enabled: bool) {
        self.converter.footnotes = enabled;
    }

    #[wasm_bindgen(js_name = setStrikethrough)]
    pub fn set_strikethrough(&mut self, enabled: bool) {
        self.converter.strikethrough = enabled;
    }

    #[wasm_bindgen(js_name = setTasklists)]
    pub fn set_tasklists(&mut self, enabled: bool) {
        self.converter.tasklists = enabled;
    }

    #[wasm_bindgen(js_name = setSmartPunctuation)]
    pub fn set_smart_punctuation(&mut self, enabled: bool) {
        self.converter.smart_punctuation = enabled;
    }

    fn to_config(&self) -> Config {
        Config {
            marker_attribute: self.marker_attribute.clone(),
            content: self.content,
            collapse_blank_lines: self.collapse_blank_lines,
            converter: self.converter.clone(),
            ..Default::default()
        }
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Browser document
// ============================================================================

struct DomDocument {
    document: web_sys::Document,
}

impl Document for DomDocument {
    type Element = web_sys::Element;

    fn marked_elements(&self, marker: &str) -> Result<Vec<web_sys::Element>> {
        validate_marker(marker)?;
        let selector = format!("[{marker}]");
        let list = self
            .document
            .query_selector_all(&selector)
            .map_err(|_| ConfigError::InvalidMarker(marker.to_string()))?;

        let mut elements = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            let Some(element) = list
                .get(i)
                .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };

            let nested = element
                .parent_element()
                .and_then(|parent| parent.closest(&selector).ok().flatten())
                .is_some();
            if !nested {
                elements.push(element);
            }
        }

        Ok(elements)
    }

    fn read_content(&self, element: &web_sys::Element, source: ContentSource) -> String {
        match source {
            ContentSource::Text => element.text_content().unwrap_or_default(),
            ContentSource::InnerHtml => element.inner_html(),
        }
    }

    fn replace_content(&mut self, element: &web_sys::Element, html: &str) {
        element.set_inner_html(html);
    }
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Serialize)]
struct PageSummary {
    elements: usize,
    rendered: usize,
    failures: Vec<FailureInfo>,
}

#[derive(Serialize)]
struct FailureInfo {
    index: usize,
    message: String,
}

impl From<&PassReport> for PageSummary {
    fn from(report: &PassReport) -> Self {
        Self {
            elements: report.len(),
            rendered: report.rendered(),
            failures: report
                .failures()
                .map(|(index, error)| FailureInfo {
                    index,
                    message: error.to_string(),
                })
                .collect(),
        }
    }
}
