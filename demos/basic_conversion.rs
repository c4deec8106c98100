//! Basic conversion example demonstrating the Markdown converter
//!
//! Run with: cargo run --example basic_conversion

use mdrip_converter::{ConversionOptions, MarkdownConverter, convert_html_to_markdown};

fn main() {
    env_logger::init();

    println!("=== mdrip Converter - Basic Examples ===\n");

    // Example 1: Simple heading and paragraph
    show(
        "Simple heading and paragraph",
        "<h1>Welcome</h1><p>This is a test document.</p>",
        None,
    );

    // Example 2: Content root selection
    show(
        "Only <main> is converted",
        r#"<html><head><title>Docs</title></head><body>
            <nav><a href="/">Home</a></nav>
            <main><h2>Install</h2><p>Run the installer.</p></main>
            <footer>Copyright</footer>
        </body></html>"#,
        None,
    );

    // Example 3: Whitespace collapse and escaping
    show(
        "Text normalization",
        "<p>Text   with    *stars*   and\n\n   [brackets]</p>",
        None,
    );

    // Example 4: Links and images against a base URL
    show(
        "Relative URLs",
        r#"<p>See <a href="../guide">the guide</a> <img src="logo.png" alt="Logo"></p>"#,
        Some("https://example.com/docs/intro/"),
    );

    // Example 5: Lists, code and tables
    show(
        "Block structure",
        r#"<main>
            <ol><li>Clone<ul><li>with submodules</li></ul></li><li>Build</li></ol>
            <pre><code class="language-sh">make all</code></pre>
            <table><tr><th>Flag</th><th align="right">Default</th></tr>
                   <tr><td>depth</td><td>512</td></tr></table>
        </main>"#,
        None,
    );

    // Example 6: Custom options
    println!("Example 6: Custom options (no title, 4-space indent, list start)");
    let converter = MarkdownConverter::with_options(ConversionOptions {
        include_title: false,
        list_indent_width: 4,
        honor_list_start: true,
        ..Default::default()
    });
    let html = r#"<title>Hidden title</title><ol start="7"><li>seven<ul><li>nested</li></ul></li><li>eight</li></ol>"#;
    println!("Input HTML:\n{}\n", html);
    println!("Output Markdown:\n{}", converter.convert_str(html));
    println!("---\n");
}

fn show(title: &str, html: &str, base_url: Option<&str>) {
    println!("Example: {}", title);
    println!("Input HTML:\n{}\n", html);
    if let Some(base) = base_url {
        println!("Base URL: {}\n", base);
    }

    let markdown = convert_html_to_markdown(html, base_url);

    println!("Output Markdown:\n{}", markdown);
    println!("---\n");
}
