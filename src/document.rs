//! Page access: selecting marked elements, reading and replacing their content.

use crate::config::{validate_marker, ContentSource};
use crate::error::{ConfigError, Result};
use ego_tree::{NodeId, NodeMut, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

/// The page structure a rendering pass works on.
pub trait Document {
    /// Handle to one element of the page.
    type Element;

    /// Elements carrying `marker`, in document order.
    ///
    /// Marked elements nested inside another marked element are not returned;
    /// they are rendered as part of the outer one.
    fn marked_elements(&self, marker: &str) -> Result<Vec<Self::Element>>;

    /// Raw content of an element.
    fn read_content(&self, element: &Self::Element, source: ContentSource) -> String;

    /// Replace the element's children with the given HTML.
    fn replace_content(&mut self, element: &Self::Element, html: &str);
}

/// An HTML page held in memory.
#[derive(Debug)]
pub struct HtmlDocument {
    html: Html,
    fragment: bool,
}

impl HtmlDocument {
    /// Parse a full document if the input opens with a doctype or an
    /// `<html>`, `<head>` or `<body>` tag, a fragment otherwise.
    ///
    /// A leading byte order mark, whitespace and comments are skipped.
    pub fn parse(source: &str) -> Self {
        if looks_like_document(source) {
            Self::parse_document(source)
        } else {
            Self::parse_fragment(source)
        }
    }

    pub fn parse_document(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
            fragment: false,
        }
    }

    pub fn parse_fragment(source: &str) -> Self {
        Self {
            html: Html::parse_fragment(source),
            fragment: true,
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    /// Serialize the page back to HTML.
    pub fn to_html(&self) -> String {
        if self.fragment {
            self.html.root_element().inner_html()
        } else {
            self.html.html()
        }
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }
}

impl Document for HtmlDocument {
    type Element = NodeId;

    fn marked_elements(&self, marker: &str) -> Result<Vec<NodeId>> {
        validate_marker(marker)?;
        // HTML attribute names are stored lowercased.
        let marker = marker.to_ascii_lowercase();
        let selector = Selector::parse(&format!("[{marker}]"))
            .map_err(|_| ConfigError::InvalidMarker(marker.clone()))?;

        let elements = self
            .html
            .select(&selector)
            .filter(|element| {
                !element
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| ancestor.value().attr(&marker).is_some())
            })
            .map(|element| element.id())
            .collect();

        Ok(elements)
    }

    fn read_content(&self, element: &NodeId, source: ContentSource) -> String {
        let Some(element) = self.element(*element) else {
            return String::new();
        };

        match source {
            ContentSource::Text => element.text().collect(),
            ContentSource::InnerHtml => element.inner_html(),
        }
    }

    fn replace_content(&mut self, element: &NodeId, html: &str) {
        let children: Vec<NodeId> = match self.html.tree.get(*element) {
            Some(node) => node.children().map(|child| child.id()).collect(),
            None => return,
        };

        for child in children {
            if let Some(mut node) = self.html.tree.get_mut(child) {
                node.detach();
            }
        }

        let rendered = Html::parse_fragment(html);
        if let Some(mut target) = self.html.tree.get_mut(*element) {
            graft(&mut target, *rendered.root_element());
        }
    }
}

// Copy the children of `source` (from another tree) under `parent`.
fn graft(parent: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let mut copy = parent.append(child.value().clone());
        graft(&mut copy, child);
    }
}

fn looks_like_document(source: &str) -> bool {
    let mut rest = source.trim_start_matches('\u{feff}').trim_start();
    while let Some(comment) = rest.strip_prefix("<!--") {
        match comment.find("-->") {
            Some(end) => rest = comment[end + 3..].trim_start(),
            None => return false,
        }
    }

    ["<!doctype", "<html", "<head", "<body"]
        .iter()
        .any(|tag| starts_with_tag(rest, tag))
}

// `<head` matches `<head>` and `<head lang=..>` but not `<header>`.
fn starts_with_tag(text: &str, tag: &str) -> bool {
    let Some(head) = text.get(..tag.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(tag)
        && text[tag.len()..]
            .chars()
            .next()
            .map_or(true, |c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_marked_elements_in_document_order() {
        let doc = HtmlDocument::parse(
            r#"<div data-markdown>one</div><p>skip</p><section data-markdown="">two</section>"#,
        );
        let elements = doc.marked_elements("data-markdown").unwrap();

        let texts: Vec<String> = elements
            .iter()
            .map(|e| doc.read_content(e, ContentSource::Text))
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_nested_marked_elements_skipped() {
        let doc = HtmlDocument::parse(
            r#"<div data-markdown>outer <span data-markdown>inner</span></div>"#,
        );
        let elements = doc.marked_elements("data-markdown").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(
            doc.read_content(&elements[0], ContentSource::Text),
            "outer inner"
        );
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let doc = HtmlDocument::parse("<div></div>");
        let err = doc.marked_elements("not valid").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidMarker(_))));
    }

    #[test]
    fn test_read_text_versus_inner_html() {
        let doc = HtmlDocument::parse("<div data-markdown>&gt; quote <b>bold</b></div>");
        let element = doc.marked_elements("data-markdown").unwrap()[0];

        assert_eq!(
            doc.read_content(&element, ContentSource::Text),
            "> quote bold"
        );
        assert_eq!(
            doc.read_content(&element, ContentSource::InnerHtml),
            "&gt; quote <b>bold</b>"
        );
    }

    #[test]
    fn test_replace_content() {
        let mut doc = HtmlDocument::parse(r#"<div data-markdown>old <i>text</i></div><p>after</p>"#);
        let element = doc.marked_elements("data-markdown").unwrap()[0];

        doc.replace_content(&element, "<h1>New</h1>\n<p>body</p>\n");

        assert_eq!(
            doc.to_html(),
            "<div data-markdown=\"\"><h1>New</h1>\n<p>body</p>\n</div><p>after</p>"
        );
    }

    #[test]
    fn test_full_document_round_trip_keeps_structure() {
        let mut doc = HtmlDocument::parse(
            "<!DOCTYPE html><html><head><title>t</title></head><body><div data-markdown># Hi</div></body></html>",
        );
        assert!(!doc.is_fragment());

        let element = doc.marked_elements("data-markdown").unwrap()[0];
        doc.replace_content(&element, "<h1>Hi</h1>");

        let html = doc.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>t</title>"));
        assert!(html.contains("<div data-markdown=\"\"><h1>Hi</h1></div>"));
    }

    #[test]
    fn test_nested_marker_case_insensitive() {
        let doc = HtmlDocument::parse(r#"<div data-md>outer <p data-md>inner</p></div>"#);
        let elements = doc.marked_elements("data-MD").unwrap();
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_document_after_leading_comment() {
        let doc = HtmlDocument::parse(
            "<!-- build 42 --><!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>",
        );
        assert!(!doc.is_fragment());

        let html = doc.to_html();
        assert!(html.starts_with("<!-- build 42 -->"));
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<head><title>T</title></head>"));
        assert!(html.contains("<body><p>x</p></body>"));
    }

    #[test]
    fn test_document_after_byte_order_mark() {
        let doc = HtmlDocument::parse(
            "\u{feff}<!DOCTYPE html><html><head><title>T</title></head><body></body></html>",
        );
        assert!(!doc.is_fragment());
        assert!(doc.to_html().contains("<head><title>T</title></head>"));
    }

    #[test]
    fn test_fragment_detection() {
        assert!(HtmlDocument::parse("<p>x</p>").is_fragment());
        assert!(!HtmlDocument::parse("  <HTML><body></body></HTML>").is_fragment());
        assert!(!HtmlDocument::parse("<!doctype html><p>x</p>").is_fragment());
        assert!(!HtmlDocument::parse("<head><title>t</title></head><p>x</p>").is_fragment());
        assert!(!HtmlDocument::parse("\n<!-- a --> <!-- b -->\n<body><p>x</p></body>").is_fragment());
        assert!(HtmlDocument::parse("<header>x</header>").is_fragment());
        assert!(HtmlDocument::parse("<!-- unclosed <html>").is_fragment());
    }
}
