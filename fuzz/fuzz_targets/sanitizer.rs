#![no_main]

use libfuzzer_sys::fuzz_target;
use mdrip_converter::convert_html_to_markdown;

const MARKER: &str = "QXJ7MARKER";

fuzz_target!(|data: &[u8]| {
    let Ok(fragment) = std::str::from_utf8(data) else {
        return;
    };
    if fragment.contains(MARKER) || fragment.contains('<') || fragment.contains('&') {
        return;
    }

    // Fuzzed text around a payload that must always be pruned
    for (open, close) in [
        ("<script>", "</script>"),
        ("<template>", "</template>"),
        ("<div hidden>", "</div>"),
        ("<span aria-hidden=\"true\">", "</span>"),
        ("<!--", "-->"),
    ] {
        let html = format!("<main><p>{fragment}</p>{open}{MARKER}{close}<p>{fragment}</p></main>");
        let markdown = convert_html_to_markdown(&html, None);
        assert!(!markdown.contains(MARKER), "{html:?} -> {markdown:?}");
    }
});
