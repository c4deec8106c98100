/// Example demonstrating deterministic Markdown output
///
/// Identical HTML always converts to byte-identical Markdown, so converted
/// pages can be cached and diffed safely.
///
/// Run with: cargo run --example deterministic_output
use mdrip_converter::{MarkdownConverter, parse_html};

fn main() {
    env_logger::init();

    println!("=== Deterministic Markdown Output Example ===\n");

    let html = r#"
        <html>
        <head><title>Test Page</title></head>
        <body>
            <h1>Main Title</h1>
            <p>This is a paragraph with <strong>bold</strong> and <em>italic</em> text.</p>
            <p>Here's a <a href="https://example.com">link</a> and an image: <img src="image.png" alt="Test Image"/></p>
            <ul>
                <li>First item</li>
                <li>Second item with <code>inline code</code></li>
                <li>Third item
                    <ul>
                        <li>Nested item 1</li>
                        <li>Nested item 2</li>
                    </ul>
                </li>
            </ul>
            <pre><code class="language-rust">
fn main() {
    println!("Hello, world!");
}
            </code></pre>
        </body>
        </html>
    "#;

    println!("Converting HTML to Markdown 5 times...\n");

    let mut results = Vec::new();
    for i in 1..=5 {
        let dom = parse_html(html);
        let converter = MarkdownConverter::new();
        let markdown = converter.convert_document(&dom);

        println!("Conversion {}: {} bytes", i, markdown.len());
        results.push(markdown);
    }

    println!("\nVerifying deterministic output...");
    let first = &results[0];
    if results.iter().all(|r| r == first) {
        println!("SUCCESS: all 5 conversions produced identical output");
        println!("\nMarkdown output:\n{}", "=".repeat(80));
        println!("{}", first);
        println!("{}", "=".repeat(80));
    } else {
        println!("FAILURE: conversions differ");
        for (i, result) in results.iter().enumerate() {
            println!("\nConversion {}:\n{}", i + 1, result);
        }
        std::process::exit(1);
    }

    // Attribute order and insignificant whitespace do not change the output
    println!("\nEquivalent markup variants:");
    let variants = [
        r#"<p><a href="/a" title="t">x</a></p>"#,
        r#"<p><a title="t" href="/a">x</a></p>"#,
        "<p>\n  <a href=\"/a\" title=\"t\">x</a>\n</p>",
    ];
    let converter = MarkdownConverter::new();
    for variant in variants {
        println!("  {:<44} -> {}", variant.replace('\n', "\\n"), converter.convert_str(variant));
    }
}
