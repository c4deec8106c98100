//! Content root selection
//!
//! Pages wrap their content in site chrome. `<main>` is the standard signal
//! for where the content lives, so it wins when present; otherwise `<body>`
//! is used, and as a last resort the whole document.

use crate::dom::{Document, NodeId};

/// Pick the node to treat as the content root
///
/// ```rust
/// use mdrip_converter::locator::locate_content_root;
/// use mdrip_converter::parser::parse_html;
///
/// let doc = parse_html("<body><nav>menu</nav><main><p>article</p></main></body>");
/// let root = locate_content_root(&doc);
/// assert_eq!(doc.tag_name(root), Some("main"));
/// ```
pub fn locate_content_root(doc: &Document) -> NodeId {
    let root = doc.root();
    let chosen = doc
        .find_first_element(root, "main")
        .or_else(|| doc.find_first_element(root, "body"))
        .unwrap_or(root);
    log::debug!(
        "content root: {}",
        doc.tag_name(chosen).unwrap_or("#document")
    );
    chosen
}

/// Text of the document `<title>`, whitespace collapsed
///
/// The first `<title>` in document order wins, wherever the parser placed
/// it. Titles inside `<svg>` or `<math>` describe a graphic, not the page,
/// and are skipped. Returns `None` for a missing or blank title.
pub fn document_title(doc: &Document) -> Option<String> {
    let title = doc
        .descendants(doc.root())
        .find(|&id| doc.is_element(id, "title") && !in_foreign_content(doc, id))?;
    let text = doc
        .text_content(title)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn in_foreign_content(doc: &Document, id: NodeId) -> bool {
    doc.ancestors(id)
        .any(|ancestor| doc.is_element(ancestor, "svg") || doc.is_element(ancestor, "math"))
}
