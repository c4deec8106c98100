//! Token estimation example demonstrating encoding resolution
//!
//! Run with: cargo run --example token_estimation

use mdrip_converter::token_estimator::{TokenEstimator, encoding_for_model};
use mdrip_converter::{
    TokenEncoding, TokenEstimateOptions, convert_html_to_markdown, estimate_token_count,
    resolve_token_encoding,
};

fn main() {
    env_logger::init();

    println!("=== Token Estimation Examples ===\n");

    // Example 1: Default encoding
    example_default();

    // Example 2: Model name to encoding
    example_models();

    // Example 3: Non-ASCII text per encoding
    example_multilingual();

    // Example 4: HTML versus converted Markdown
    example_reduction();
}

fn example_default() {
    println!("Example 1: Default encoding");
    let options = TokenEstimateOptions::default();
    let text = "This is a simple test.";
    println!("Encoding: {}", resolve_token_encoding(&options));
    println!("Text: \"{}\"", text);
    println!("Estimated tokens: {}\n", estimate_token_count(text, &options));
}

fn example_models() {
    println!("Example 2: Model name to encoding");
    for model in ["gpt-4o", "gpt-4.1-mini", "o3", "gpt-4", "gpt-3.5-turbo", "unknown-model"] {
        println!("  {:<16} -> {}", model, encoding_for_model(model));
    }

    let options = TokenEstimateOptions {
        token_model: Some("gpt-4o".to_string()),
        token_encoding: Some(TokenEncoding::Cl100kBase),
    };
    println!(
        "Explicit encoding wins over model: {}\n",
        resolve_token_encoding(&options)
    );
}

fn example_multilingual() {
    println!("Example 3: Non-ASCII text");
    let text = "お誕生日おめでとう";
    for encoding in [TokenEncoding::Cl100kBase, TokenEncoding::O200kBase] {
        let estimator = TokenEstimator::new(encoding);
        println!("  {:<12} {} tokens", encoding, estimator.estimate(text));
    }
    println!();
}

fn example_reduction() {
    println!("Example 4: HTML versus Markdown");
    let html = r#"<html><head>
        <style>.post { margin: 0 auto; max-width: 42rem; }</style>
        <script src="/analytics.js"></script>
    </head><body>
        <nav class="site-nav"><a href="/">Home</a> <a href="/blog">Blog</a></nav>
        <main><article class="post">
            <h1 class="post-title">Shipping faster builds</h1>
            <p class="lead">We cut <strong>build times</strong> in half by caching
            <code>target/</code> between runs.</p>
        </article></main>
    </body></html>"#;

    let options = TokenEstimateOptions::default();
    let markdown = convert_html_to_markdown(html, None);
    let html_tokens = estimate_token_count(html, &options);
    let markdown_tokens = estimate_token_count(&markdown, &options);

    println!("Markdown:\n{}\n", markdown);
    println!("HTML tokens:     {}", html_tokens);
    println!("Markdown tokens: {}", markdown_tokens);
    if html_tokens > 0 {
        let reduction = 100.0 * (1.0 - markdown_tokens as f64 / html_tokens as f64);
        println!("Reduction:       {:.1}%", reduction);
    }
}
