//! Markdown renderer - transforms the sanitized tree into Markdown
//!
//! The renderer walks the sanitized content tree in document order and emits
//! Markdown through a closed set of tag rules. The output is meant for
//! language models, so it favors compactness over visual fidelity: no
//! decorative markup, no blank lines inside list items, no HTML passthrough.
//!
//! # Pipeline
//!
//! 1. **Parse**: html5ever builds the [`Document`] arena
//! 2. **Locate**: first `<main>`, else `<body>`, else the document root
//! 3. **Sanitize**: excluded subtrees are marked and never visited
//! 4. **Render**: one [`Rule`] per tag, links and images pass through the
//!    [`UrlGuard`], code fences ask the language detector
//! 5. **Normalize**: LF endings, trailing whitespace, blank-line runs
//!
//! # Element Rules
//!
//! - **Headings (h1-h6)**: ATX headings on one line; empty headings are dropped
//! - **Paragraphs and containers**: blank-line separated blocks
//! - **Emphasis**: `**strong**`, `*em*`, `~~del~~`
//! - **Links and images**: `[text](url)` and `![alt](src)`
//! - **Lists**: `- ` and `N. ` markers, nested lists indented per level
//! - **Code**: fenced blocks with a language tag, backtick spans inline
//! - **Tables**: GFM pipe tables, first row is the header
//!
//! # Examples
//!
//! Input HTML:
//! ```html
//! <main>
//!   <h2>Intro</h2>
//!   <p>Hello <strong>world</strong>.</p>
//!   <ul><li>one</li><li>two</li></ul>
//! </main>
//! ```
//!
//! Output Markdown:
//! ```markdown
//! ## Intro
//!
//! Hello **world**.
//!
//! - one
//! - two
//! ```

use crate::dom::{Document, Element, NodeData, NodeId};
use crate::language::detect_language;
use crate::locator::{document_title, locate_content_root};
use crate::parser::parse_html;
use crate::sanitizer::{SanitizedTree, Sanitizer};
use crate::url_guard::UrlGuard;

/// Default nesting limit below the content root
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default indentation per nested list level
pub const DEFAULT_LIST_INDENT_WIDTH: usize = 2;

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Base URL for resolving relative links and images
    pub base_url: Option<String>,
    /// Emit the document `<title>` as a leading `# ` heading
    pub include_title: bool,
    /// Spaces of indentation per nested list level
    pub list_indent_width: usize,
    /// Number ordered lists from their `start` attribute instead of 1
    pub honor_list_start: bool,
    /// Elements nested deeper than this below the content root are dropped
    pub max_depth: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            include_title: true,
            list_indent_width: DEFAULT_LIST_INDENT_WIDTH,
            honor_list_start: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Rendering rule selected by tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `h1`-`h6`
    Heading(usize),
    /// `p`
    Paragraph,
    /// Block containers without markup of their own
    Block,
    /// Inline wrapper with a symmetric marker
    Emphasis(&'static str),
    /// `a`
    Link,
    /// `ul` / `ol`
    List { ordered: bool },
    /// `li`
    ListItem,
    /// `pre`
    CodeBlock,
    /// `code` outside `pre`: inline span or standalone block
    Code,
    /// `img`
    Image,
    /// `br`
    LineBreak,
    /// `hr`
    ThematicBreak,
    /// `blockquote`
    Blockquote,
    /// `table`
    Table,
    /// Rendered as nothing, children included
    Skip,
    /// Unknown or presentational: children only
    PassThrough,
}

impl Rule {
    /// Rule for a lowercase tag name
    ///
    /// ```rust
    /// use mdrip_converter::converter::Rule;
    ///
    /// assert_eq!(Rule::for_tag("h3"), Rule::Heading(3));
    /// assert_eq!(Rule::for_tag("strike"), Rule::Emphasis("~~"));
    /// assert_eq!(Rule::for_tag("custom-widget"), Rule::PassThrough);
    /// ```
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "h1" => Rule::Heading(1),
            "h2" => Rule::Heading(2),
            "h3" => Rule::Heading(3),
            "h4" => Rule::Heading(4),
            "h5" => Rule::Heading(5),
            "h6" => Rule::Heading(6),
            "p" => Rule::Paragraph,
            "div" | "section" | "article" | "header" | "footer" | "body" | "html" | "main"
            | "aside" | "figure" | "figcaption" | "details" | "summary" | "address" | "form"
            | "fieldset" | "dl" | "dt" | "dd" | "caption" => Rule::Block,
            "strong" | "b" => Rule::Emphasis("**"),
            "em" | "i" => Rule::Emphasis("*"),
            "del" | "s" | "strike" => Rule::Emphasis("~~"),
            "a" => Rule::Link,
            "ul" => Rule::List { ordered: false },
            "ol" => Rule::List { ordered: true },
            "li" => Rule::ListItem,
            "pre" => Rule::CodeBlock,
            "code" => Rule::Code,
            "img" => Rule::Image,
            "br" => Rule::LineBreak,
            "hr" => Rule::ThematicBreak,
            "blockquote" => Rule::Blockquote,
            "table" => Rule::Table,
            "head" | "title" | "source" | "track" | "meta" | "link" => Rule::Skip,
            _ => Rule::PassThrough,
        }
    }

    /// Rule inside code, where only line breaks keep a meaning
    fn for_code_tag(tag: &str) -> Self {
        match tag {
            "br" => Rule::LineBreak,
            _ => Rule::PassThrough,
        }
    }

    /// Whether the rule produces a block rather than inline content
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Rule::Heading(_)
                | Rule::Paragraph
                | Rule::Block
                | Rule::List { .. }
                | Rule::ListItem
                | Rule::CodeBlock
                | Rule::ThematicBreak
                | Rule::Blockquote
                | Rule::Table
                | Rule::Skip
        )
    }
}

/// Table column alignment (GFM)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableAlignment {
    Left,
    Center,
    Right,
}

/// Markdown converter
///
/// Holds only configuration; every call builds its own tree and render state,
/// so one converter can be shared freely.
///
/// # Examples
///
/// ```rust
/// use mdrip_converter::converter::{ConversionOptions, MarkdownConverter};
///
/// let converter = MarkdownConverter::with_options(ConversionOptions {
///     base_url: Some("https://example.com/base".to_string()),
///     ..Default::default()
/// });
/// let markdown = converter.convert_str(r#"<p>See <a href="/docs">docs</a>.</p>"#);
/// assert_eq!(markdown, "See [docs](https://example.com/docs).");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: ConversionOptions,
    sanitizer: Sanitizer,
}

impl MarkdownConverter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            options,
            sanitizer: Sanitizer::new(),
        }
    }

    /// Options in effect
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Parse and convert an HTML string
    ///
    /// Total: malformed markup is repaired by the parser, and empty or
    /// whitespace-only input yields an empty string.
    pub fn convert_str(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }
        let doc = parse_html(html);
        self.convert_document(&doc)
    }

    /// Convert an already parsed document
    pub fn convert_document(&self, doc: &Document) -> String {
        let root = locate_content_root(doc);
        let tree = self.sanitizer.prune(doc, root);
        let guard = UrlGuard::new(self.options.base_url.as_deref());
        let mut ctx = RenderContext::new(&self.options, guard);

        if self.options.include_title
            && let Some(title) = document_title(doc)
        {
            ctx.out.push_str("# ");
            ctx.out.push_str(&escape_text(&title));
            ctx.ensure_blank_line();
        }

        if !tree.is_excluded(root) {
            ctx.render_node(&tree, root, 0);
        }

        let markdown = normalize_output(&ctx.out);
        log::debug!(
            "rendered {} nodes into {} bytes of Markdown",
            doc.node_count(),
            markdown.len()
        );
        markdown
    }
}

/// One open list: its kind and the next ordinal
#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ordered: bool,
    next: usize,
}

/// Per-call render state
struct RenderContext<'o> {
    options: &'o ConversionOptions,
    guard: UrlGuard,
    out: String,
    lists: Vec<ListFrame>,
    in_code: bool,
    /// Inside link, emphasis or heading text, where blocks flatten to text
    inline_only: bool,
    depth_warned: bool,
}

impl<'o> RenderContext<'o> {
    fn new(options: &'o ConversionOptions, guard: UrlGuard) -> Self {
        Self {
            options,
            guard,
            out: String::with_capacity(4096),
            lists: Vec::new(),
            in_code: false,
            inline_only: false,
            depth_warned: false,
        }
    }

    fn render_node(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        if depth > self.options.max_depth {
            if !self.depth_warned {
                log::warn!(
                    "nesting deeper than {} levels, skipping the deeper content",
                    self.options.max_depth
                );
                self.depth_warned = true;
            }
            return;
        }

        match tree.doc().node(id).data() {
            NodeData::Text(text) => self.push_text(text),
            NodeData::Element(element) => self.render_element(tree, id, element, depth),
            NodeData::Document => self.render_children(tree, id, depth),
            NodeData::Comment(_) => {}
        }
    }

    fn render_children(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        for child in tree.children(id) {
            self.render_node(tree, child, depth + 1);
        }
    }

    fn render_element(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        element: &Element,
        depth: usize,
    ) {
        let rule = if self.in_code {
            Rule::for_code_tag(element.name())
        } else {
            Rule::for_tag(element.name())
        };

        if self.inline_only && rule.is_block() && rule != Rule::Skip {
            self.render_flattened(tree, id, rule, depth);
            return;
        }

        match rule {
            Rule::Heading(level) => self.render_heading(tree, id, level, depth),
            Rule::Paragraph | Rule::Block => self.render_block(tree, id, depth),
            Rule::Emphasis(marker) => self.render_emphasis(tree, id, marker, depth),
            Rule::Link => self.render_link(tree, id, element, depth),
            Rule::List { ordered } => self.render_list(tree, id, element, ordered, depth),
            Rule::ListItem => self.render_list_item(tree, id, depth),
            Rule::CodeBlock => {
                let code = tree
                    .child_elements(id, "code")
                    .next()
                    .and_then(|code| tree.doc().element(code));
                let language = detect_language(Some(element), code);
                self.render_code_block(tree, id, &language, depth);
            }
            Rule::Code => {
                if !self.inline_only && is_standalone_code(tree, id) {
                    let language = detect_language(None, Some(element));
                    self.render_code_block(tree, id, &language, depth);
                } else {
                    self.render_inline_code(tree, id, depth);
                }
            }
            Rule::Image => self.render_image(element),
            Rule::LineBreak => self.push_line_break(),
            Rule::ThematicBreak => {
                self.ensure_blank_line();
                self.out.push_str("---");
                self.ensure_blank_line();
            }
            Rule::Blockquote => self.render_blockquote(tree, id, depth),
            Rule::Table => self.render_table(tree, id, depth),
            Rule::Skip => {}
            Rule::PassThrough => self.render_children(tree, id, depth),
        }
    }

    /// Emit a text node: verbatim in code, collapsed and escaped elsewhere
    fn push_text(&mut self, text: &str) {
        if self.in_code {
            self.out.push_str(text);
            return;
        }

        let mut words = text.split_ascii_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() {
                self.push_space();
            }
            return;
        }

        if text.starts_with(|c: char| c.is_ascii_whitespace()) {
            self.push_space();
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(&escape_text(word));
        }
        if text.ends_with(|c: char| c.is_ascii_whitespace()) {
            self.out.push(' ');
        }
    }

    /// Line break inside a block; runs of breaks never open a blank line
    fn push_line_break(&mut self) {
        if self.in_code {
            self.out.push('\n');
            return;
        }
        let kept = self.out.trim_end_matches(' ').len();
        self.out.truncate(kept);
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Single separating space, never at the start of a line
    fn push_space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(|c: char| c.is_ascii_whitespace()) {
            self.out.push(' ');
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn ensure_blank_line(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.push('\n');
        } else {
            self.out.push_str("\n\n");
        }
    }

    /// Render children into a fresh buffer and hand it back
    fn capture(&mut self, render: impl FnOnce(&mut Self)) -> String {
        let saved = std::mem::take(&mut self.out);
        render(self);
        std::mem::replace(&mut self.out, saved)
    }

    /// Render children in place, then cut their output off the buffer
    ///
    /// Unlike [`Self::capture`], whitespace decisions still see the text that
    /// precedes the element.
    fn render_inline(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) -> String {
        let start = self.out.len();
        self.render_children(tree, id, depth);
        self.out.split_off(start)
    }

    /// Render children as inline text only
    fn render_inline_text(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        depth: usize,
    ) -> String {
        let was_inline = std::mem::replace(&mut self.inline_only, true);
        let content = self.render_inline(tree, id, depth);
        self.inline_only = was_inline;
        content
    }

    /// A block element met inside inline text: its text, space separated
    fn render_flattened(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        rule: Rule,
        depth: usize,
    ) {
        self.push_space();
        match rule {
            Rule::CodeBlock => self.render_inline_code(tree, id, depth),
            Rule::ThematicBreak => {}
            _ => self.render_children(tree, id, depth),
        }
        self.push_space();
    }

    /// Collect the literal text of a code element
    fn collect_code(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) -> String {
        let was_in_code = std::mem::replace(&mut self.in_code, true);
        let code = self.render_inline(tree, id, depth);
        self.in_code = was_in_code;
        code
    }

    /// Re-emit inline content with its edge whitespace kept outside the markup
    fn wrap_inline(&mut self, captured: &str, prefix: &str, inner: &str, suffix: &str) {
        if captured.starts_with(|c: char| c.is_ascii_whitespace()) {
            self.push_space();
        }
        self.out.push_str(prefix);
        self.out.push_str(inner);
        self.out.push_str(suffix);
        if captured.ends_with(|c: char| c.is_ascii_whitespace()) {
            self.out.push(' ');
        }
    }

    fn render_heading(&mut self, tree: &SanitizedTree<'_>, id: NodeId, level: usize, depth: usize) {
        self.ensure_blank_line();
        let content = self.render_inline_text(tree, id, depth);
        let text = collapse_whitespace(&content);
        if text.is_empty() {
            return;
        }
        self.out.push_str(&"#".repeat(level));
        self.out.push(' ');
        self.out.push_str(&text);
        self.ensure_blank_line();
    }

    fn render_block(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        self.ensure_blank_line();
        self.render_children(tree, id, depth);
        self.ensure_blank_line();
    }

    fn render_emphasis(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        marker: &str,
        depth: usize,
    ) {
        let content = self.render_inline_text(tree, id, depth);
        let inner = content.trim_matches(|c: char| c.is_ascii_whitespace());
        if inner.is_empty() {
            if !content.is_empty() {
                self.push_space();
            }
            return;
        }
        self.wrap_inline(&content, marker, inner, marker);
    }

    fn render_link(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        element: &Element,
        depth: usize,
    ) {
        let content = self.render_inline_text(tree, id, depth);
        let text = collapse_whitespace(&content);
        if text.is_empty() {
            if !content.is_empty() {
                self.push_space();
            }
            return;
        }

        let target = element
            .attr("href")
            .and_then(|href| self.guard.link_target(href))
            .filter(|target| !target.is_empty());

        match target {
            Some(target) => {
                let suffix = format!("]({})", format_destination(&target));
                self.wrap_inline(&content, "[", &text, &suffix);
            }
            None => self.wrap_inline(&content, "", &text, ""),
        }
    }

    fn render_image(&mut self, element: &Element) {
        let Some(src) = element
            .attr("src")
            .filter(|src| !src.trim().is_empty())
            .and_then(|src| self.guard.image_source(src))
        else {
            return;
        };
        let alt = escape_text(&collapse_whitespace(element.attr("alt").unwrap_or("")));
        self.out.push_str("![");
        self.out.push_str(&alt);
        self.out.push_str("](");
        self.out.push_str(&format_destination(&src));
        self.out.push(')');
    }

    fn render_list(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        element: &Element,
        ordered: bool,
        depth: usize,
    ) {
        let start = if ordered && self.options.honor_list_start {
            element
                .attr("start")
                .and_then(|start| start.trim().parse::<usize>().ok())
                .unwrap_or(1)
        } else {
            1
        };

        let doc = tree.doc();
        let inside_list = !self.lists.is_empty()
            && doc
                .parent(id)
                .and_then(|parent| doc.tag_name(parent))
                .is_some_and(|tag| matches!(tag, "ul" | "ol"));

        let frame = ListFrame {
            ordered,
            next: start,
        };
        if inside_list {
            // A list placed directly in a list nests under the preceding item
            let indent = self.options.list_indent_width;
            let body = self.capture(|ctx| ctx.render_list_items(tree, id, frame, depth));
            let nested = format_list_item(&" ".repeat(indent), &body, indent);
            if !nested.trim().is_empty() {
                self.ensure_line_start();
                self.out.push_str(&nested);
                self.out.push('\n');
            }
            return;
        }

        self.ensure_blank_line();
        self.render_list_items(tree, id, frame, depth);
        self.ensure_blank_line();
    }

    fn render_list_items(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        frame: ListFrame,
        depth: usize,
    ) {
        self.lists.push(frame);
        self.render_children(tree, id, depth);
        self.lists.pop();
    }

    fn render_list_item(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        let marker = match self.lists.last_mut() {
            Some(frame) if frame.ordered => {
                let marker = format!("{}. ", frame.next);
                frame.next += 1;
                marker
            }
            _ => "- ".to_string(),
        };

        let body = self.capture(|ctx| ctx.render_children(tree, id, depth));
        let item = format_list_item(&marker, &body, self.options.list_indent_width);

        self.ensure_line_start();
        self.out.push_str(&item);
        self.out.push('\n');
    }

    fn render_code_block(
        &mut self,
        tree: &SanitizedTree<'_>,
        id: NodeId,
        language: &str,
        depth: usize,
    ) {
        self.ensure_blank_line();
        let code = self.collect_code(tree, id, depth);
        let code = code.strip_suffix('\n').unwrap_or(&code);
        if code.trim().is_empty() {
            return;
        }

        let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
        self.out.push_str(&fence);
        self.out.push_str(language);
        self.out.push('\n');
        self.out.push_str(code);
        self.out.push('\n');
        self.out.push_str(&fence);
        self.ensure_blank_line();
    }

    fn render_inline_code(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        let code = self.collect_code(tree, id, depth);
        if let Some(span) = code_span(&code) {
            self.out.push_str(&span);
        }
    }

    fn render_blockquote(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        let body = self.capture(|ctx| ctx.render_children(tree, id, depth));
        let body = body.trim_matches('\n');
        if body.trim().is_empty() {
            return;
        }

        self.ensure_blank_line();
        for (i, line) in body.split('\n').enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            if line.trim().is_empty() {
                self.out.push('>');
            } else {
                self.out.push_str("> ");
                self.out.push_str(line);
            }
        }
        self.ensure_blank_line();
    }

    fn render_table(&mut self, tree: &SanitizedTree<'_>, id: NodeId, depth: usize) {
        let doc = tree.doc();

        if let Some(caption) = tree.child_elements(id, "caption").next() {
            self.render_block(tree, caption, depth + 1);
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut alignments: Vec<TableAlignment> = Vec::new();
        for row in table_rows(tree, id) {
            let cells: Vec<NodeId> = tree
                .children(row)
                .filter(|&cell| matches!(doc.tag_name(cell), Some("th" | "td")))
                .collect();
            if cells.is_empty() {
                continue;
            }
            if rows.is_empty() {
                alignments = cells
                    .iter()
                    .map(|&cell| doc.element(cell).map_or(TableAlignment::Left, cell_alignment))
                    .collect();
            }
            let rendered = cells
                .iter()
                .map(|&cell| {
                    let content = self.capture(|ctx| ctx.render_children(tree, cell, depth + 3));
                    collapse_whitespace(&content).replace('|', "\\|")
                })
                .collect();
            rows.push(rendered);
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        alignments.resize(columns, TableAlignment::Left);

        self.ensure_blank_line();
        let mut rows = rows.into_iter();
        if let Some(header) = rows.next() {
            write_table_row(&mut self.out, &header, columns);
        }
        self.out.push('|');
        for alignment in &alignments {
            self.out.push_str(match alignment {
                TableAlignment::Left => " --- |",
                TableAlignment::Center => " :---: |",
                TableAlignment::Right => " ---: |",
            });
        }
        self.out.push('\n');
        for row in rows {
            write_table_row(&mut self.out, &row, columns);
        }
        self.ensure_blank_line();
    }
}

/// Rows of a table, including rows inside `thead`, `tbody` and `tfoot`
fn table_rows(tree: &SanitizedTree<'_>, table: NodeId) -> Vec<NodeId> {
    let doc = tree.doc();
    let mut rows = Vec::new();
    for child in tree.children(table) {
        match doc.tag_name(child) {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(tree.child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}

/// Column alignment from the `align` attribute or an inline `text-align`
fn cell_alignment(cell: &Element) -> TableAlignment {
    let declared = cell.attr("align").map(str::to_string).or_else(|| {
        cell.attr("style")?.split(';').find_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            property
                .trim()
                .eq_ignore_ascii_case("text-align")
                .then(|| value.to_string())
        })
    });

    match declared.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("center") => TableAlignment::Center,
        Some("right") => TableAlignment::Right,
        _ => TableAlignment::Left,
    }
}

fn write_table_row(out: &mut String, cells: &[String], columns: usize) {
    out.push('|');
    for i in 0..columns {
        match cells.get(i).filter(|cell| !cell.is_empty()) {
            Some(cell) => {
                out.push(' ');
                out.push_str(cell);
                out.push_str(" |");
            }
            None => out.push_str(" |"),
        }
    }
    out.push('\n');
}

/// Whether a `code` outside `pre` stands alone as a block
///
/// It does when its parent is a block container (not a paragraph) and every
/// surviving sibling is either blank text or a block.
fn is_standalone_code(tree: &SanitizedTree<'_>, id: NodeId) -> bool {
    let doc = tree.doc();
    let Some(parent) = doc.parent(id) else {
        return false;
    };
    let parent_is_container = parent == tree.root()
        || doc
            .tag_name(parent)
            .is_some_and(|tag| Rule::for_tag(tag) == Rule::Block);
    if !parent_is_container {
        return false;
    }

    tree.children(parent)
        .filter(|&sibling| sibling != id)
        .all(|sibling| match doc.node(sibling).data() {
            NodeData::Text(text) => text.trim_ascii().is_empty(),
            NodeData::Element(element) => Rule::for_tag(element.name()).is_block(),
            NodeData::Document | NodeData::Comment(_) => true,
        })
}

/// Format a list item: marker on the first line, continuation lines indented
///
/// Blank lines are dropped so the item stays tight, except inside fences.
fn format_list_item(marker: &str, body: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let mut fence = FenceTracker::default();
    let lines: Vec<&str> = body
        .split('\n')
        .filter_map(|line| match fence.observe(line) {
            LineKind::Code => Some(line),
            LineKind::Text | LineKind::Fence => {
                let line = line.trim_end();
                (!line.is_empty()).then_some(line)
            }
        })
        .collect();

    let Some((first, rest)) = lines.split_first() else {
        return marker.trim_end().to_string();
    };

    let mut item = String::with_capacity(body.len() + marker.len());
    item.push_str(marker);
    item.push_str(first.trim_start());
    for line in rest {
        item.push('\n');
        if !line.is_empty() {
            item.push_str(&pad);
            item.push_str(line);
        }
    }
    item
}

/// Backslash-escape characters that would otherwise turn text into syntax
///
/// `*`, `` ` ``, `[`, `]` and `\` are always escaped; `_` only at a word
/// boundary, so `snake_case` stays readable.
///
/// ```rust
/// use mdrip_converter::converter::escape_text;
///
/// assert_eq!(escape_text("2 * 3"), r"2 \* 3");
/// assert_eq!(escape_text("[note]"), r"\[note\]");
/// assert_eq!(escape_text("snake_case"), "snake_case");
/// assert_eq!(escape_text("_private"), r"\_private");
/// ```
pub fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut escaped = String::with_capacity(text.len());
    for (i, &ch) in chars.iter().enumerate() {
        let needs_escape = match ch {
            '\\' | '*' | '`' | '[' | ']' => true,
            '_' => {
                let before = i.checked_sub(1).and_then(|j| chars.get(j));
                let after = chars.get(i + 1);
                !(before.is_some_and(|c| c.is_alphanumeric())
                    && after.is_some_and(|c| c.is_alphanumeric()))
            }
            _ => false,
        };
        if needs_escape {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Backtick span around inline code, longer than any backtick run inside
fn code_span(code: &str) -> Option<String> {
    let code = code.replace(['\r', '\n'], " ");
    if code.trim().is_empty() {
        return None;
    }
    let ticks = "`".repeat(longest_backtick_run(&code) + 1);
    let pad = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };
    Some(format!("{ticks}{pad}{code}{pad}{ticks}"))
}

/// Link destination, angle-bracketed when it would not parse bare
fn format_destination(url: &str) -> String {
    let mut balance = 0i32;
    let mut balanced = true;
    for ch in url.chars() {
        match ch {
            '(' => balance += 1,
            ')' => {
                balance -= 1;
                if balance < 0 {
                    balanced = false;
                }
            }
            _ => {}
        }
    }
    balanced &= balance == 0;

    if balanced && !url.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        url.to_string()
    } else {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    }
}

/// Classification of one output line relative to code fences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// Ordinary Markdown
    Text,
    /// Opening or closing fence line
    Fence,
    /// Literal code between fences
    Code,
}

/// Tracks whether consecutive lines sit inside a backtick fence
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<usize>,
}

impl FenceTracker {
    fn observe(&mut self, line: &str) -> LineKind {
        let trimmed = line.trim_start();
        let ticks = trimmed.chars().take_while(|&c| c == '`').count();
        match self.open {
            Some(open) => {
                if ticks >= open && trimmed[ticks..].trim().is_empty() {
                    self.open = None;
                    LineKind::Fence
                } else {
                    LineKind::Code
                }
            }
            None if ticks >= 3 && !trimmed[ticks..].contains('`') => {
                self.open = Some(ticks);
                LineKind::Fence
            }
            None => LineKind::Text,
        }
    }
}

/// Normalize rendered Markdown for stable output
///
/// 1. **Line Endings**: CRLF and CR become LF
/// 2. **Trailing Whitespace**: removed from every line outside fences
/// 3. **Blank Lines**: runs collapse to a single blank line outside fences
/// 4. **Trim**: no leading or trailing blank lines
///
/// Lines between fences are copied verbatim.
///
/// ```rust
/// use mdrip_converter::converter::normalize_output;
///
/// assert_eq!(normalize_output("Line 1  \r\n\r\n\r\nLine 2\n"), "Line 1\n\nLine 2");
/// assert_eq!(normalize_output("```\na  \n\n\nb\n```"), "```\na  \n\n\nb\n```");
/// ```
pub fn normalize_output(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let mut result = String::with_capacity(text.len());
    let mut fence = FenceTracker::default();
    let mut prev_blank = false;

    for line in text.split('\n') {
        match fence.observe(line) {
            LineKind::Code => {
                result.push_str(line);
                result.push('\n');
                prev_blank = false;
            }
            LineKind::Text | LineKind::Fence => {
                let trimmed = line.trim_end();
                if trimmed.is_empty() {
                    if !prev_blank {
                        result.push('\n');
                        prev_blank = true;
                    }
                } else {
                    result.push_str(trimmed);
                    result.push('\n');
                    prev_blank = false;
                }
            }
        }
    }

    result.trim().to_string()
}
