//! Code block language detection
//!
//! Publishing tools annotate code blocks with their language in several
//! conventions. They are checked in a fixed order and the first hit wins:
//!
//! 1. `data-lang` on the `<pre>`
//! 2. `data-lang` on the child `<code>`
//! 3. `language-<lang>` class on `<code>` (Prism, CommonMark renderers)
//! 4. `hljs <lang>` classes on `<code>` (highlight.js)
//! 5. `highlight-<lang>` class on `<code>`
//! 6. `language-<lang>` / `lang-<lang>` class on the `<pre>` itself
//!
//! Values that would break the fence line (whitespace, backticks) are skipped.
//! The result is lowercase; an empty string means "no language".

use crate::dom::Element;

/// Detect the fence language for a `<pre>` and its optional `<code>` child
///
/// ```rust
/// use mdrip_converter::dom::Element;
/// use mdrip_converter::language::detect_language;
///
/// let pre = Element::new("pre", vec![("data-lang".into(), "Rust".into())]);
/// let code = Element::new("code", vec![("class".into(), "language-go".into())]);
/// assert_eq!(detect_language(Some(&pre), Some(&code)), "rust");
/// assert_eq!(detect_language(None, Some(&code)), "go");
/// assert_eq!(detect_language(None, None), "");
/// ```
pub fn detect_language(pre: Option<&Element>, code: Option<&Element>) -> String {
    let found = pre
        .and_then(|pre| data_lang(pre))
        .or_else(|| code.and_then(data_lang))
        .or_else(|| code.and_then(|code| class_with_prefix(code, "language-")))
        .or_else(|| code.and_then(hljs_language))
        .or_else(|| code.and_then(|code| class_with_prefix(code, "highlight-")))
        .or_else(|| {
            pre.and_then(|pre| {
                class_with_prefix(pre, "language-").or_else(|| class_with_prefix(pre, "lang-"))
            })
        });

    match found {
        Some(language) => {
            log::trace!("detected code language '{language}'");
            language
        }
        None => String::new(),
    }
}

fn data_lang(element: &Element) -> Option<String> {
    element.attr("data-lang").and_then(accept)
}

fn class_with_prefix(element: &Element, prefix: &str) -> Option<String> {
    element
        .classes()
        .filter_map(|class| class.strip_prefix(prefix))
        .find_map(accept)
}

/// highlight.js marks blocks with `hljs` plus the language as its own token
fn hljs_language(element: &Element) -> Option<String> {
    if !element.classes().any(|class| class == "hljs") {
        return None;
    }
    element
        .classes()
        .find(|&class| class != "hljs")
        .and_then(accept)
}

/// Normalize a candidate; reject values that cannot sit on a fence line
fn accept(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '`') {
        return None;
    }
    Some(value.to_lowercase())
}
