//! Corpus conversion tool
//!
//! Converts one HTML file to Markdown and prints the result. With
//! `--token-report` the estimated token counts of the input and output are
//! printed to stderr as well.

use clap::{ArgAction, Parser};
use mdrip_converter::converter::{DEFAULT_LIST_INDENT_WIDTH, DEFAULT_MAX_DEPTH};
use mdrip_converter::{
    ConversionOptions, MarkdownConverter, TokenEncoding, TokenEstimateOptions,
    estimate_token_count, parse_html_bytes, resolve_token_encoding,
};
use std::fs;
use std::path::PathBuf;
use std::process;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// HTML file to convert
    input: PathBuf,

    /// Base URL for resolving relative links and images
    #[arg(long)]
    base_url: Option<String>,

    /// Content-Type header value used for charset detection
    #[arg(long)]
    content_type: Option<String>,

    /// Do not emit the document title as a leading heading
    #[arg(long = "no-title", action = ArgAction::SetTrue)]
    no_title: bool,

    /// Spaces of indentation per nested list level
    #[arg(long, default_value_t = DEFAULT_LIST_INDENT_WIDTH)]
    indent: usize,

    /// Number ordered lists from their `start` attribute
    #[arg(long, action = ArgAction::SetTrue)]
    honor_list_start: bool,

    /// Maximum element depth below the content root
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print estimated token counts for the HTML and the Markdown
    #[arg(long, action = ArgAction::SetTrue)]
    token_report: bool,

    /// Model name used to pick the token encoding
    #[arg(long)]
    token_model: Option<String>,

    /// Token encoding (`cl100k_base` or `o200k_base`); wins over --token-model
    #[arg(long)]
    token_encoding: Option<TokenEncoding>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let html = match fs::read(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file {}: {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let converter = MarkdownConverter::with_options(ConversionOptions {
        base_url: cli.base_url.clone(),
        include_title: !cli.no_title,
        list_indent_width: cli.indent,
        honor_list_start: cli.honor_list_start,
        max_depth: cli.max_depth,
    });

    let markdown = if html.trim_ascii().is_empty() {
        String::new()
    } else {
        match parse_html_bytes(&html, cli.content_type.as_deref()) {
            Ok(doc) => converter.convert_document(&doc),
            Err(e) => {
                eprintln!("Error decoding {}: {}", cli.input.display(), e);
                process::exit(e.code() as i32);
            }
        }
    };

    println!("{}", markdown);

    if cli.token_report {
        let options = TokenEstimateOptions {
            token_model: cli.token_model.clone(),
            token_encoding: cli.token_encoding,
        };
        let html_text = String::from_utf8_lossy(&html);
        let html_tokens = estimate_token_count(&html_text, &options);
        let markdown_tokens = estimate_token_count(&markdown, &options);
        log::debug!(
            "{}: {} bytes of HTML, {} bytes of Markdown",
            cli.input.display(),
            html.len(),
            markdown.len()
        );

        eprintln!("Encoding:        {}", resolve_token_encoding(&options));
        eprintln!("HTML tokens:     {}", html_tokens);
        eprintln!("Markdown tokens: {}", markdown_tokens);
        if html_tokens > 0 {
            let reduction = 100.0 * (1.0 - markdown_tokens as f64 / html_tokens as f64);
            eprintln!("Reduction:       {:.1}%", reduction);
        }
    }
}
