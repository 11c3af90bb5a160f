//! The rendering pass over marked elements.

use crate::config::Config;
use crate::converter::Converter;
use crate::document::Document;
use crate::error::{ConvertError, Result};
use crate::normalize::normalize_with;
use tracing::{debug, info, warn};

/// Outcome for one marked element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementOutcome {
    /// Position of the element among the marked elements.
    pub index: usize,
    /// `Err` leaves the element's content unchanged.
    pub result: std::result::Result<(), ConvertError>,
}

impl ElementOutcome {
    pub fn is_rendered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-element results of a pass, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub outcomes: Vec<ElementOutcome>,
}

impl PassReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn rendered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_rendered()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &ConvertError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.index, e)))
    }

    /// True when every element rendered.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(ElementOutcome::is_rendered)
    }
}

/// Render every marked element of `document` with `converter`.
///
/// Each element is read, de-indented, converted and replaced on its own; a
/// conversion error is recorded for that element and the pass moves on.
pub fn transform<D: Document>(
    document: &mut D,
    converter: &dyn Converter,
    config: &Config,
) -> Result<PassReport> {
    let elements = document.marked_elements(&config.marker_attribute)?;
    let mut outcomes = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        let raw = document.read_content(element, config.content);
        let markdown = normalize_with(&raw, config.collapse_blank_lines);

        let result = converter.to_html(&markdown).map(|html| {
            debug!(index, bytes = html.len(), "rendered element");
            document.replace_content(element, &html);
        });

        if let Err(ref error) = result {
            warn!(index, converter = converter.name(), %error, "element left unrendered");
        }

        outcomes.push(ElementOutcome { index, result });
    }

    let report = PassReport { outcomes };
    info!(
        marker = %config.marker_attribute,
        elements = report.len(),
        rendered = report.rendered(),
        "rendering pass complete"
    );

    Ok(report)
}
