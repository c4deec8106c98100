//! HTML5 parser using html5ever
//!
//! This module provides HTML parsing functionality that handles malformed
//! markup gracefully according to the HTML5 specification.
//!
//! # Overview
//!
//! html5ever implements the WHATWG HTML5 parsing algorithm, so broken markup is
//! repaired the same way a browser would repair it: missing `<html>`, `<head>`
//! and `<body>` are synthesized, unclosed tags are closed and entities are
//! decoded. The resulting reference-counted tree is copied into the
//! [`Document`] arena that the rest of the pipeline works on.
//!
//! # Examples
//!
//! ```rust
//! use mdrip_converter::parser::parse_html;
//!
//! // Parse well-formed HTML
//! let doc = parse_html("<html><body><h1>Hello</h1></body></html>");
//! assert!(doc.find_first_element(doc.root(), "h1").is_some());
//!
//! // Parse malformed HTML (missing closing tags)
//! let doc = parse_html("<h1>Hello");
//! assert!(doc.find_first_element(doc.root(), "body").is_some());
//! ```
//!
//! # Configuration
//!
//! The parser uses default html5ever configuration:
//! - **Scripting**: Disabled (scripts are not executed)
//! - **Error Handling**: Errors are collected but parsing continues
//! - **Tree Builder**: RcDom, converted into the arena afterwards

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::charset::decode_html;
use crate::dom::{Document, Element, NodeData, NodeId};
use crate::error::ConversionError;

/// Parse an HTML string into an arena document
///
/// Never fails: html5ever recovers from any malformed markup, and the empty
/// string yields a document with empty `html`, `head` and `body` elements.
pub fn parse_html(html: &str) -> Document {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let doc = build_document(&dom);
    log::trace!("parsed {} bytes of HTML into {} nodes", html.len(), doc.node_count());
    doc
}

/// Parse raw HTML bytes into an arena document with charset detection
///
/// The charset is resolved from the `Content-Type` header, then from
/// `<meta>` declarations, then defaults to UTF-8. See [`crate::charset`].
///
/// # Errors
///
/// Returns `ConversionError::EncodingError` when the bytes are invalid for the
/// detected charset or the charset is unknown.
///
/// # Examples
///
/// ```rust
/// use mdrip_converter::parser::parse_html_bytes;
///
/// let doc = parse_html_bytes(b"<p>caf\xE9</p>", Some("text/html; charset=ISO-8859-1"))
///     .expect("latin-1 input decodes");
/// assert_eq!(doc.text_content(doc.root()), "café");
/// ```
pub fn parse_html_bytes(
    html: &[u8],
    content_type: Option<&str>,
) -> Result<Document, ConversionError> {
    let decoded = decode_html(html, content_type)?;
    Ok(parse_html(&decoded))
}

/// Copy an html5ever tree into the arena
///
/// Doctype and processing-instruction nodes have no content and are dropped.
/// The walk uses an explicit stack so deeply nested input cannot exhaust the
/// call stack.
fn build_document(dom: &RcDom) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<(Handle, NodeId)> = vec![(dom.document.clone(), doc.root())];

    while let Some((handle, id)) = stack.pop() {
        for child in handle.children.borrow().iter() {
            let data = match child.data {
                RcNodeData::Element {
                    ref name,
                    ref attrs,
                    ..
                } => {
                    let attrs = attrs
                        .borrow()
                        .iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect();
                    NodeData::Element(Element::new(name.local.as_ref(), attrs))
                }
                RcNodeData::Text { ref contents } => NodeData::Text(contents.borrow().to_string()),
                RcNodeData::Comment { ref contents } => NodeData::Comment(contents.to_string()),
                RcNodeData::Document
                | RcNodeData::Doctype { .. }
                | RcNodeData::ProcessingInstruction { .. } => continue,
            };
            let child_id = doc.append(id, data);
            stack.push((child.clone(), child_id));
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<html><body><h1>Hello</h1></body></html>");
        let h1 = doc.find_first_element(doc.root(), "h1").expect("h1 present");
        assert_eq!(doc.text_content(h1), "Hello");
    }

    #[test]
    fn test_parse_malformed_html() {
        // Missing closing tags
        let doc = parse_html("<html><body><h1>Hello");
        assert!(doc.find_first_element(doc.root(), "h1").is_some());
    }

    #[test]
    fn test_parse_empty_input_synthesizes_skeleton() {
        let doc = parse_html("");
        assert!(doc.find_first_element(doc.root(), "html").is_some());
        assert!(doc.find_first_element(doc.root(), "head").is_some());
        assert!(doc.find_first_element(doc.root(), "body").is_some());
    }

    #[test]
    fn test_children_keep_document_order() {
        let doc = parse_html("<body><p>a</p><p>b</p><p>c</p></body>");
        let body = doc.find_first_element(doc.root(), "body").unwrap();
        let texts: Vec<String> = doc
            .children(body)
            .iter()
            .map(|&id| doc.text_content(id))
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_comments_are_kept_as_comment_nodes() {
        let doc = parse_html("<body><!-- note --><p>x</p></body>");
        let body = doc.find_first_element(doc.root(), "body").unwrap();
        let first = doc.children(body)[0];
        assert_eq!(
            doc.node(first).data(),
            &NodeData::Comment(" note ".to_string())
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = parse_html("<p>&amp; &lt; &gt; &quot; &#39; &#x41;</p>");
        assert_eq!(doc.text_content(doc.root()), "& < > \" ' A");
    }

    #[test]
    fn test_attributes_are_preserved() {
        let doc = parse_html(r#"<a HREF="/x" data-Lang="Go">t</a>"#);
        let a = doc.find_first_element(doc.root(), "a").unwrap();
        let el = doc.element(a).unwrap();
        assert_eq!(el.attr("href"), Some("/x"));
        assert_eq!(el.attr("data-lang"), Some("Go"));
    }

    #[test]
    fn test_parent_links_point_upwards() {
        let doc = parse_html("<main><p><em>x</em></p></main>");
        let em = doc.find_first_element(doc.root(), "em").unwrap();
        let p = doc.parent(em).unwrap();
        assert_eq!(doc.tag_name(p), Some("p"));
        assert!(doc.ancestors(em).any(|id| doc.is_element(id, "main")));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let html = format!("{}x{}", "<div>".repeat(5000), "</div>".repeat(5000));
        let doc = parse_html(&html);
        assert!(doc.text_content(doc.root()).contains('x'));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let result = parse_html_bytes(b"\xFF\xFE<p>Invalid</p>", None);
        assert!(matches!(result, Err(ConversionError::EncodingError(_))));
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(input in ".{0,256}") {
            let doc = parse_html(&input);
            prop_assert!(doc.node_count() >= 1);
        }
    }
}
