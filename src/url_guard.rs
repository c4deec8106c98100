//! URL resolution and scheme checks for links and images
//!
//! Relative URLs are resolved against the optional base URL with WHATWG
//! semantics (the `url` crate). Resolution never fails from the caller's point
//! of view: a malformed URL, or a relative URL without a base, is kept as the
//! literal attribute value.
//!
//! Only two schemes are treated as unsafe:
//! - `javascript:` in a link: the link wrapper is dropped
//! - `data:` in an image source: the image is dropped
//!
//! # Examples
//!
//! ```rust
//! use mdrip_converter::url_guard::UrlGuard;
//!
//! let guard = UrlGuard::new(Some("https://example.com/base"));
//! assert_eq!(guard.link_target("/docs"), Some("https://example.com/docs".to_string()));
//! assert_eq!(guard.link_target("JavaScript:alert(1)"), None);
//! assert_eq!(guard.image_source("data:image/gif;base64,R0lG"), None);
//! ```

use url::Url;

/// Resolves and validates `href` / `src` values for one conversion
#[derive(Debug, Clone, Default)]
pub struct UrlGuard {
    base: Option<Url>,
}

impl UrlGuard {
    /// Create a guard; an unparsable base URL is ignored
    pub fn new(base_url: Option<&str>) -> Self {
        let base = base_url.and_then(|raw| match Url::parse(raw.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Invalid base URL '{raw}': {e}, relative URLs stay unresolved");
                None
            }
        });
        Self { base }
    }

    /// Base URL in effect, if any
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Resolve `raw` against the base URL, falling back to the literal
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }
        let Some(base) = self.base.as_ref() else {
            return raw.to_string();
        };
        match base.join(raw) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                log::debug!("Failed to resolve URL '{raw}' against base '{base}': {e}");
                raw.to_string()
            }
        }
    }

    /// Resolved link target, or `None` when the link must be unwrapped
    pub fn link_target(&self, href: &str) -> Option<String> {
        let resolved = self.resolve(href);
        if scheme_of(&resolved).as_deref() == Some("javascript") {
            log::trace!("dropping javascript: link wrapper");
            return None;
        }
        Some(resolved)
    }

    /// Resolved image source, or `None` when the image must be skipped
    pub fn image_source(&self, src: &str) -> Option<String> {
        let resolved = self.resolve(src);
        if scheme_of(&resolved).as_deref() == Some("data") {
            log::trace!("skipping data: image");
            return None;
        }
        Some(resolved)
    }
}

/// Lowercase scheme of an absolute URL, or `None` for relative references
///
/// Follows the URL parser's preprocessing: leading C0 controls and spaces are
/// ignored, and tabs and newlines anywhere in the scheme are removed, so
/// `" java\tscript:"` is still recognized.
///
/// ```rust
/// use mdrip_converter::url_guard::scheme_of;
///
/// assert_eq!(scheme_of("HTTPS://example.com").as_deref(), Some("https"));
/// assert_eq!(scheme_of("/relative/path"), None);
/// assert_eq!(scheme_of("java\nscript:void(0)").as_deref(), Some("javascript"));
/// ```
pub fn scheme_of(url: &str) -> Option<String> {
    let trimmed = url.trim_start_matches(|c: char| c <= ' ');
    let (candidate, _) = trimmed.split_once(':')?;
    let scheme: String = candidate
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}
