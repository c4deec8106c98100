//! End-to-end conversion tests
//!
//! Whole documents go through the public entry points: parsing, content root
//! selection, sanitization, rendering and normalization together.

use mdrip_converter::{
    ConversionError, ConversionOptions, MarkdownConverter, convert_html_bytes,
    convert_html_to_markdown, parse_html,
};
use proptest::prelude::*;

const ARTICLE: &str = r#"
  <html>
    <head><title>Example Page</title></head>
    <body>
      <nav><a href="/">Home</a></nav>
      <main>
        <h2>Intro</h2>
        <p>Hello <strong>world</strong> and <a href="/docs">docs</a>.</p>
        <ul>
          <li>one</li>
          <li>two</li>
        </ul>
        <pre class="language-ts"><code>const n = 1;</code></pre>
      </main>
      <footer>Copyright</footer>
    </body>
  </html>
"#;

#[test]
fn test_common_document() {
    let markdown = convert_html_to_markdown(ARTICLE, Some("https://example.com/base"));

    assert_eq!(
        markdown,
        "# Example Page\n\n\
         ## Intro\n\n\
         Hello **world** and [docs](https://example.com/docs).\n\n\
         - one\n\
         - two\n\n\
         ```ts\n\
         const n = 1;\n\
         ```"
    );
}

#[test]
fn test_scripts_and_styles_skipped() {
    let html = r#"
      <html>
        <body>
          <main>
            <script>window.secret = 1;</script>
            <style>body { display: none; }</style>
            <p>Visible text</p>
          </main>
        </body>
      </html>
    "#;

    let markdown = convert_html_to_markdown(html, None);

    assert_eq!(markdown, "Visible text");
}

#[test]
fn test_code_language_detection() {
    let cases = [
        (r#"<main><pre><code class="language-python">print("hello")</code></pre></main>"#, "```python"),
        (r#"<main><pre><code class="hljs javascript">const x = 1;</code></pre></main>"#, "```javascript"),
        (r#"<main><pre data-lang="rust"><code>fn main() {}</code></pre></main>"#, "```rust"),
        (r#"<main><pre><code data-lang="go">func main() {}</code></pre></main>"#, "```go"),
        (r#"<main><pre><code class="highlight-ruby">puts "hi"</code></pre></main>"#, "```ruby"),
        (r#"<main><pre><code class="prettyprint">x</code></pre></main>"#, "```\nx"),
    ];

    for (html, expected) in cases {
        let markdown = convert_html_to_markdown(html, None);
        assert!(markdown.starts_with(expected), "{html} -> {markdown}");
    }
}

#[test]
fn test_strikethrough() {
    let html = r#"
      <main>
        <p>This is <del>deleted</del> text.</p>
        <p>Also <s>struck</s> and <strike>old strike</strike>.</p>
      </main>
    "#;

    let markdown = convert_html_to_markdown(html, None);

    assert_eq!(
        markdown,
        "This is ~~deleted~~ text.\n\nAlso ~~struck~~ and ~~old strike~~."
    );
}

#[test]
fn test_javascript_href_and_safe_link() {
    let html = r#"
      <main>
        <a href="javascript:alert('xss')">Click me</a>
        <a href="https://example.com">Safe link</a>
      </main>
    "#;

    let markdown = convert_html_to_markdown(html, None);

    assert!(markdown.contains("Click me"));
    assert!(!markdown.contains("javascript:"));
    assert!(markdown.contains("[Safe link](https://example.com)"));
}

#[test]
fn test_images() {
    let html = r#"
      <main>
        <img src="data:image/gif;base64,R0lGODlhAQABAA" alt="pixel">
        <img src="https://example.com/img.png" alt="real image">
        <picture>
          <source srcset="img.webp" type="image/webp">
          <img src="/photo.png" alt="photo">
        </picture>
      </main>
    "#;

    let markdown = convert_html_to_markdown(html, Some("https://example.com/gallery/"));

    assert_eq!(
        markdown,
        "![real image](https://example.com/img.png) ![photo](https://example.com/photo.png)"
    );
}

#[test]
fn test_relative_urls_without_base_are_literal() {
    let html = r#"<p><a href="../up">Up</a> <img src="pic.png" alt="pic"></p>"#;
    assert_eq!(convert_html_to_markdown(html, None), "[Up](../up) ![pic](pic.png)");
}

#[test]
fn test_invalid_base_url_keeps_literals() {
    let html = r#"<p><a href="/docs">Docs</a></p>"#;
    assert_eq!(convert_html_to_markdown(html, Some("not a url")), "[Docs](/docs)");
}

#[test]
fn test_body_is_used_without_main() {
    let html = "<body><h1>Title</h1><p>Body text</p><footer>Footer</footer></body>";
    assert_eq!(
        convert_html_to_markdown(html, None),
        "# Title\n\nBody text\n\nFooter"
    );
}

#[test]
fn test_title_outside_head() {
    let html = "<html><body><title>Page T</title><p>x</p></body></html>";
    assert_eq!(convert_html_to_markdown(html, None), "# Page T\n\nx");
}

#[test]
fn test_card_link_keeps_plain_text() {
    let html = r#"<main>
        <a href="/posts/1"><h3>First post</h3><p>A short teaser.</p></a>
        <ul><li>tag</li><ul><li>subtag</li></ul></ul>
        <p>Line one<br><br>Line two</p>
    </main>"#;

    let markdown = convert_html_to_markdown(html, Some("https://example.com/"));

    assert_eq!(
        markdown,
        "[First post A short teaser.](https://example.com/posts/1)\n\n\
         - tag\n\
         \x20 - subtag\n\n\
         Line one\nLine two"
    );
}

#[test]
fn test_mixed_document_structure() {
    let html = r#"<main>
        <h1>Guide</h1>
        <blockquote><p>Read this first.</p></blockquote>
        <ol>
          <li>Install<ul><li>stable toolchain</li></ul></li>
          <li>Run <code>cargo test</code></li>
        </ol>
        <table>
          <tr><th>Flag</th><th>Meaning</th></tr>
          <tr><td><code>-q</code></td><td>quiet</td></tr>
        </table>
        <hr>
        <p>Done.</p>
    </main>"#;

    let markdown = convert_html_to_markdown(html, None);

    assert_eq!(
        markdown,
        "# Guide\n\n\
         > Read this first.\n\n\
         1. Install\n\
         \x20 - stable toolchain\n\
         2. Run `cargo test`\n\n\
         | Flag | Meaning |\n\
         | --- | --- |\n\
         | `-q` | quiet |\n\n\
         ---\n\n\
         Done."
    );
}

#[test]
fn test_converter_with_options() {
    let converter = MarkdownConverter::with_options(ConversionOptions {
        include_title: false,
        list_indent_width: 4,
        honor_list_start: true,
        ..Default::default()
    });

    let html = r#"<title>Ignored</title><ol start="3"><li>c<ul><li>nested</li></ul></li><li>d</li></ol>"#;

    assert_eq!(converter.convert_str(html), "3. c\n    - nested\n4. d");
}

#[test]
fn test_convert_document_matches_convert_str() {
    let converter = MarkdownConverter::new();
    let doc = parse_html(ARTICLE);
    assert_eq!(converter.convert_document(&doc), converter.convert_str(ARTICLE));
}

#[test]
fn test_convert_bytes_utf8() {
    let markdown = convert_html_bytes("<p>naïve café</p>".as_bytes(), None, None).unwrap();
    assert_eq!(markdown, "naïve café");
}

#[test]
fn test_convert_bytes_with_meta_charset() {
    let mut html = b"<html><head><meta charset=\"windows-1252\"></head><body><p>".to_vec();
    html.extend_from_slice(b"\x93quoted\x94 caf\xE9");
    html.extend_from_slice(b"</p></body></html>");

    let markdown = convert_html_bytes(&html, None, None).unwrap();

    assert_eq!(markdown, "\u{201C}quoted\u{201D} café");
}

#[test]
fn test_convert_bytes_content_type_wins() {
    let html = b"<meta charset=\"utf-8\"><p>caf\xE9</p>";
    let markdown = convert_html_bytes(html, Some("text/html; charset=ISO-8859-1"), None).unwrap();
    assert_eq!(markdown, "café");
}

#[test]
fn test_convert_bytes_with_base_url() {
    let markdown = convert_html_bytes(
        br#"<p><a href="page">Page</a></p>"#,
        None,
        Some("https://example.com/dir/"),
    )
    .unwrap();
    assert_eq!(markdown, "[Page](https://example.com/dir/page)");
}

#[test]
fn test_convert_bytes_invalid_utf8() {
    let err = convert_html_bytes(b"<p>\xFF\xFE</p>", None, None).unwrap_err();
    assert!(matches!(err, ConversionError::EncodingError(_)));
    assert_eq!(err.code(), 2);
}

#[test]
fn test_convert_bytes_empty() {
    assert_eq!(convert_html_bytes(b"", None, None).unwrap(), "");
    assert_eq!(convert_html_bytes(b"  \n ", None, None).unwrap(), "");
}

#[test]
fn test_malformed_html() {
    let html = "<p>Unclosed paragraph<p>Second <b>bold <i>both</b> italic</i><div>tail";
    let markdown = convert_html_to_markdown(html, None);
    assert!(markdown.contains("Unclosed paragraph"));
    assert!(markdown.contains("**bold *both***"));
    assert!(markdown.ends_with("tail"));
}

proptest! {
    #[test]
    fn prop_conversion_never_panics(html in "\\PC{0,512}") {
        let _ = convert_html_to_markdown(&html, Some("https://example.com/"));
    }

    #[test]
    fn prop_conversion_is_deterministic(html in "(<[a-z]{1,6}( [a-z]+=\"[a-z:/ ]*\")?>|</[a-z]{1,6}>|[a-zA-Z *_`\\[\\]]{0,12}){0,40}") {
        let first = convert_html_to_markdown(&html, None);
        let second = convert_html_to_markdown(&html, None);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_output_is_normalized(html in "(<(p|li|ul|ol|h1|pre|br|div|em)>|</(p|li|ul|ol|h1|pre|div|em)>|[a-z \\n]{0,10}){0,40}") {
        let markdown = convert_html_to_markdown(&html, None);
        prop_assert!(!markdown.contains('\r'));
        prop_assert_eq!(markdown.trim(), markdown.as_str());
    }
}
