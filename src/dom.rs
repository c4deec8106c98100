//! Arena document tree
//!
//! html5ever hands back a reference-counted tree with interior mutability.
//! The converter copies it once into a flat arena where every node is addressed
//! by a [`NodeId`] handle. Children are stored as handle lists and each node
//! keeps an optional parent handle that is only ever used for upward lookups.
//!
//! # Examples
//!
//! ```rust
//! use mdrip_converter::dom::{Document, Element, NodeData};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let p = doc.append(root, NodeData::Element(Element::new("P", Vec::new())));
//! doc.append(p, NodeData::Text("hello".to_string()));
//!
//! assert_eq!(doc.tag_name(p), Some("p"));
//! assert_eq!(doc.text_content(root), "hello");
//! assert_eq!(doc.parent(p), Some(root));
//! ```

/// Handle to a node stored in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node inside its arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element tag name and attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element; tag and attribute names are stored lowercase
    pub fn new(name: &str, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// Lowercase tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attributes in document order
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Look up an attribute value by case-insensitive name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the attribute is present, whatever its value
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }
}

/// Payload of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Root container of the whole document
    Document,
    /// Element node
    Element(Element),
    /// Literal text, entities already decoded
    Text(String),
    /// Comment text; never rendered
    Comment(String),
}

/// Node stored in the arena
#[derive(Debug, Clone)]
pub struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Node payload
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Parent handle (lookups only)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in document order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Element payload, if this is an element
    pub fn as_element(&self) -> Option<&Element> {
        match self.data {
            NodeData::Element(ref element) => Some(element),
            _ => None,
        }
    }
}

/// Arena holding one parsed document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document containing only its root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Handle of the document root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a new last child under `parent` and return its handle
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Borrow a node
    ///
    /// Handles are only produced by this document, so the lookup is in bounds.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Element payload of `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).as_element()
    }

    /// Lowercase tag name of `id`, if it is an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    /// Whether `id` is an element with the given tag name
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    /// Child handles of `id`
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Parent handle of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Pre-order traversal of `from` and everything below it
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![from],
        }
    }

    /// First element named `tag` at or below `from`, in document order
    pub fn find_first_element(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(from).find(|&id| self.is_element(id, tag))
    }

    /// Concatenated text of every text node below `id`; comments are skipped
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            if let NodeData::Text(ref contents) = self.node(node).data {
                text.push_str(contents);
            }
        }
        text
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterative pre-order walk; see [`Document::descendants`]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)]) -> NodeData {
        NodeData::Element(Element::new(
            name,
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let body = doc.append(root, element("body", &[]));
        let main = doc.append(body, element("main", &[("Class", "a  b")]));
        doc.append(main, NodeData::Text("one ".to_string()));
        doc.append(main, NodeData::Comment("secret".to_string()));
        let em = doc.append(main, element("em", &[]));
        doc.append(em, NodeData::Text("two".to_string()));
        (doc, body, main, em)
    }

    #[test]
    fn test_names_are_lowercased() {
        let el = Element::new("DIV", vec![("ARIA-Hidden".to_string(), "True".to_string())]);
        assert_eq!(el.name(), "div");
        assert_eq!(el.attr("aria-hidden"), Some("True"));
        assert_eq!(el.attr("ARIA-HIDDEN"), Some("True"));
        assert!(!el.has_attr("hidden"));
    }

    #[test]
    fn test_classes_split_on_whitespace() {
        let (doc, _, main, _) = sample();
        let classes: Vec<&str> = doc.element(main).unwrap().classes().collect();
        assert_eq!(classes, vec!["a", "b"]);
    }

    #[test]
    fn test_parent_and_ancestors() {
        let (doc, body, main, em) = sample();
        assert_eq!(doc.parent(em), Some(main));
        let ancestors: Vec<NodeId> = doc.ancestors(em).collect();
        assert_eq!(ancestors, vec![main, body, doc.root()]);
        assert_eq!(doc.parent(doc.root()), None);
    }

    #[test]
    fn test_descendants_are_document_order() {
        let (doc, body, main, em) = sample();
        let order: Vec<NodeId> = doc.descendants(body).collect();
        assert_eq!(order[0], body);
        assert_eq!(order[1], main);
        assert_eq!(*order.last().unwrap(), doc.children(em)[0]);
        assert_eq!(order.len(), 6);
    }

    #[test]
    fn test_node_count_includes_root() {
        assert_eq!(Document::new().node_count(), 1);
        let (doc, _, _, _) = sample();
        assert_eq!(doc.node_count(), 7);
    }

    #[test]
    fn test_find_first_element() {
        let (doc, _, main, em) = sample();
        assert_eq!(doc.find_first_element(doc.root(), "main"), Some(main));
        assert_eq!(doc.find_first_element(doc.root(), "em"), Some(em));
        assert_eq!(doc.find_first_element(em, "main"), None);
    }

    #[test]
    fn test_text_content_skips_comments() {
        let (doc, _, main, _) = sample();
        assert_eq!(doc.text_content(main), "one two");
    }
}
