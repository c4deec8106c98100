#![no_main]

use libfuzzer_sys::fuzz_target;
use mdrip_converter::{convert_html_bytes, convert_html_to_markdown};

fuzz_target!(|data: &[u8]| {
    // Charset detection and decoding may fail but must not panic
    let _ = convert_html_bytes(data, None, Some("https://example.com/"));

    if let Ok(html) = std::str::from_utf8(data) {
        let markdown = convert_html_to_markdown(html, None);
        assert!(!markdown.contains('\r'));
        assert_eq!(markdown.trim(), markdown);
        assert_eq!(markdown, convert_html_to_markdown(html, None));
    }
});
