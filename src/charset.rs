//! Character encoding detection and decoding
//!
//! Callers that fetch pages hold raw bytes and a `Content-Type` header rather
//! than a string. The declared charset label is looked up in `encoding_rs`,
//! which applies the WHATWG label table (so `ISO-8859-1` decodes as
//! `windows-1252`, as browsers do).
//!
//! Label sources, first match wins:
//!
//! 1. The `charset` parameter of the `Content-Type` header
//! 2. A `<meta charset>` or `<meta http-equiv="Content-Type">` declaration in
//!    the first 1024 bytes
//! 3. UTF-8
//!
//! ```rust
//! use mdrip_converter::charset::detect_encoding;
//!
//! let encoding = detect_encoding(Some("text/html; charset=Shift_JIS"), b"").unwrap();
//! assert_eq!(encoding.name(), "Shift_JIS");
//!
//! let encoding = detect_encoding(None, b"<meta charset=\"iso-8859-1\">").unwrap();
//! assert_eq!(encoding.name(), "windows-1252");
//!
//! let encoding = detect_encoding(None, b"<p>No charset</p>").unwrap();
//! assert_eq!(encoding.name(), "UTF-8");
//! ```

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::error::ConversionError;

/// Bytes scanned for a `<meta>` declaration
const META_SCAN_LIMIT: usize = 1024;

/// Covers `<meta charset=x>` and the `content="text/html; charset=x"` form
static META_CHARSET: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)<meta\b[^>]*?\bcharset\s*=\s*["']?([^"'\s;>/]+)"#).ok());

/// Charset label from a `Content-Type` header value
///
/// ```rust
/// use mdrip_converter::charset::content_type_charset;
///
/// assert_eq!(content_type_charset("text/html; Charset=\"EUC-JP\""), Some("EUC-JP"));
/// assert_eq!(content_type_charset("text/html"), None);
/// ```
pub fn content_type_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Charset label declared by a `<meta>` tag near the start of the document
pub fn meta_charset(html: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&html[..html.len().min(META_SCAN_LIMIT)]);
    let regex = META_CHARSET.as_ref()?;
    let label = regex.captures(&head)?.get(1)?.as_str().to_string();
    Some(label)
}

/// Resolve the encoding for a byte payload
///
/// # Errors
///
/// `ConversionError::EncodingError` when the declared label is not a known
/// encoding.
pub fn detect_encoding(
    content_type: Option<&str>,
    html: &[u8],
) -> Result<&'static Encoding, ConversionError> {
    let label = content_type
        .and_then(content_type_charset)
        .map(str::to_string)
        .or_else(|| meta_charset(html));

    match label {
        Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            ConversionError::EncodingError(format!("Unsupported charset '{}'", label))
        }),
        None => Ok(UTF_8),
    }
}

/// Decode HTML bytes to text
///
/// UTF-8 input is borrowed without copying. Malformed input is an error
/// rather than a source of replacement characters.
///
/// # Errors
///
/// `ConversionError::EncodingError` when the charset is unknown or the bytes
/// are malformed for it.
pub fn decode_html<'a>(
    html: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, ConversionError> {
    let encoding = detect_encoding(content_type, html)?;
    log::debug!("decoding {} bytes as {}", html.len(), encoding.name());

    if encoding == UTF_8 {
        return std::str::from_utf8(html).map(Cow::Borrowed).map_err(|e| {
            ConversionError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}",
                e.valid_up_to()
            ))
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                encoding.name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_content_type_variants() {
        assert_eq!(content_type_charset("text/html; charset=UTF-8"), Some("UTF-8"));
        assert_eq!(
            content_type_charset("text/html;charset=windows-1252"),
            Some("windows-1252")
        );
        assert_eq!(
            content_type_charset("text/html; CHARSET=\"shift_jis\"; x=y"),
            Some("shift_jis")
        );
        assert_eq!(content_type_charset("text/html; charset="), None);
        assert_eq!(content_type_charset(""), None);
    }

    #[test]
    fn test_meta_variants() {
        assert_eq!(
            meta_charset(b"<meta charset='iso-8859-1'>"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(
            meta_charset(b"<META CHARSET=utf-8/>"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            meta_charset(b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=EUC-JP\">"),
            Some("EUC-JP".to_string())
        );
        assert_eq!(meta_charset(b"<p>charset=big5</p>"), None);
    }

    #[test]
    fn test_meta_beyond_scan_limit_is_ignored() {
        let mut html = vec![b' '; META_SCAN_LIMIT];
        html.extend_from_slice(b"<meta charset=\"iso-8859-1\">");
        assert_eq!(meta_charset(&html), None);
    }

    #[test]
    fn test_unknown_label() {
        let result = detect_encoding(Some("text/html; charset=not-a-charset"), b"");
        assert!(matches!(result, Err(ConversionError::EncodingError(_))));
    }

    #[test]
    fn test_decode_utf8_is_borrowed() {
        let decoded = decode_html("héllo".as_bytes(), None).unwrap();
        assert!(matches!(decoded, Cow::Borrowed("héllo")));
    }

    #[test]
    fn test_decode_latin1() {
        let decoded = decode_html(b"caf\xE9", Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(decoded, "café");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_html(b"ok \xFF", None).unwrap_err();
        assert_eq!(err.code(), 2);
    }

    proptest! {
        #[test]
        fn prop_content_type_has_priority_over_meta(
            header in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "shift_jis"]),
            meta in prop::sample::select(vec!["GB2312", "BIG5", "EUC-KR"]),
        ) {
            let content_type = format!("text/html; charset={header}");
            let html = format!(r#"<html><head><meta charset="{meta}"></head></html>"#);
            let expected = Encoding::for_label(header.as_bytes());
            prop_assert_eq!(detect_encoding(Some(&content_type), html.as_bytes()).ok(), expected);
        }
    }
}
