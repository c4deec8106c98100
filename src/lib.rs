//! mdrip Converter - HTML to Markdown for language models
//!
//! This library turns arbitrary third-party HTML into compact Markdown that
//! keeps the human-readable content and drops everything else: scripts,
//! styles, navigation, and text hidden from human readers.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `parser`: HTML5 parsing using html5ever into the `dom` arena
//! - `charset`: Character encoding detection for raw byte input
//! - `locator`: Content root selection (`main`, `body`, document)
//! - `sanitizer`: Pruning of non-content and hidden subtrees
//! - `url_guard`: URL resolution and unsafe scheme checks
//! - `language`: Code fence language detection
//! - `converter`: Markdown rendering and output normalization
//! - `token_estimator`: Token count estimation for LLMs
//!
//! # Examples
//!
//! ```rust
//! use mdrip_converter::{convert_html_to_markdown, estimate_token_count, TokenEstimateOptions};
//!
//! let html = r#"<main><h2>Intro</h2><p>Hello <strong>world</strong> and <a href="/docs">docs</a>.</p></main>"#;
//! let markdown = convert_html_to_markdown(html, Some("https://example.com/base"));
//! assert_eq!(markdown, "## Intro\n\nHello **world** and [docs](https://example.com/docs).");
//!
//! let tokens = estimate_token_count(&markdown, &TokenEstimateOptions::default());
//! assert!(tokens > 0);
//! ```

// Module declarations
pub mod charset;
pub mod converter;
pub mod dom;
pub mod error;
pub mod language;
pub mod locator;
pub mod parser;
pub mod sanitizer;
pub mod token_estimator;
pub mod url_guard;

// Re-export main types for convenience
pub use converter::{ConversionOptions, MarkdownConverter};
pub use error::ConversionError;
pub use parser::{parse_html, parse_html_bytes};
pub use token_estimator::{
    TokenEncoding, TokenEstimateOptions, estimate_token_count, resolve_token_encoding,
};

/// Convert an HTML string to Markdown
///
/// Never fails. Relative links and images are resolved against `base_url`
/// when one is given and parses; otherwise they are kept as written.
pub fn convert_html_to_markdown(html: &str, base_url: Option<&str>) -> String {
    let options = ConversionOptions {
        base_url: base_url.map(str::to_string),
        ..Default::default()
    };
    MarkdownConverter::with_options(options).convert_str(html)
}

/// Convert raw HTML bytes to Markdown, decoding by charset first
///
/// The charset comes from the `Content-Type` header value when it names one,
/// then from a `<meta>` declaration in the first 1024 bytes, then UTF-8.
///
/// # Errors
///
/// `ConversionError::EncodingError` when the charset is unknown or the bytes
/// are invalid for it.
///
/// # Examples
///
/// ```rust
/// use mdrip_converter::convert_html_bytes;
///
/// let markdown = convert_html_bytes(b"<p>caf\xE9</p>", Some("text/html; charset=ISO-8859-1"), None)
///     .expect("latin-1 input decodes");
/// assert_eq!(markdown, "café");
/// ```
pub fn convert_html_bytes(
    html: &[u8],
    content_type: Option<&str>,
    base_url: Option<&str>,
) -> Result<String, ConversionError> {
    if html.trim_ascii().is_empty() {
        return Ok(String::new());
    }
    let doc = parse_html_bytes(html, content_type)?;
    let options = ConversionOptions {
        base_url: base_url.map(str::to_string),
        ..Default::default()
    };
    Ok(MarkdownConverter::with_options(options).convert_document(&doc))
}
