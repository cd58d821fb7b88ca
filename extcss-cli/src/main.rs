//! extcss CLI: compile extended stylesheets, check selectors and run them
//! against JSON DOM fixtures.
//!
//! Run with: cargo run --bin extcss -- <command>
//!
//! Build with `--features match-trace` to print every evaluation step of
//! `query` to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use extcss::{DomHost, StylesheetOptions, StylesheetParser, parse_selector, query};
use extcss_common::warning::{clear_warnings, warn_once};
use extcss_dom::DomTree;
use owo_colors::OwoColorize;

/// extcss: extended CSS selectors for filter lists
#[derive(Parser, Debug)]
#[command(name = "extcss")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Compile a stylesheet and print its rules as JSON
    extcss parse rules.css

    # Keep `content` on rules that also remove their elements
    extcss parse --keep-content rules.css

    # Check a selector and print its AST
    extcss check 'div:has(> span:contains(Sponsored))'

    # Run a selector against a DOM fixture
    extcss query --dom page.json 'div:has(> img):upward(1)'
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a stylesheet file; rules go to stdout, warnings to stderr
    Parse {
        /// Stylesheet to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Keep the `content` property of rules that remove elements
        #[arg(long)]
        keep_content: bool,
    },

    /// Parse one selector and print its normalized text and AST
    Check {
        /// Selector to parse
        #[arg(value_name = "SELECTOR")]
        selector: String,
    },

    /// Run a selector against a JSON DOM fixture and print matching paths
    Query {
        /// JSON DOM fixture
        #[arg(long, value_name = "FIXTURE")]
        dom: PathBuf,

        /// Selector to run
        #[arg(value_name = "SELECTOR")]
        selector: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file, keep_content } => run_parse(&file, keep_content),
        Command::Check { selector } => run_check(&selector),
        Command::Query { dom, selector } => run_query(&dom, &selector),
    }
}

/// Compile a stylesheet and print the merged rules.
fn run_parse(file: &Path, keep_content: bool) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    // Warnings are printed below with the rule count, not as they happen.
    let mut parser = StylesheetParser::with_options(StylesheetOptions {
        keep_content_on_remove: keep_content,
        report_warnings: false,
    });
    let parsed = parser.parse_stylesheet(&text);

    clear_warnings();
    for warning in &parsed.warnings {
        warn_once("ExtCSS", warning);
    }
    println!("{}", serde_json::to_string_pretty(&parsed.rules)?);

    eprintln!(
        "{} {} rules, {} skipped{}",
        "===".dimmed(),
        parsed.rules.len(),
        parsed.warnings.len(),
        if parsed.global_debug { ", global debug" } else { "" }
    );
    Ok(())
}

/// Parse a selector; a parse error is the command's error.
fn run_check(selector: &str) -> Result<()> {
    let list = match parse_selector(selector) {
        Ok(list) => list,
        Err(error) => {
            eprintln!("{} {error}", "✗".red());
            bail!("invalid selector");
        }
    };

    println!("{} {list}", "✓".green());
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

/// Load a fixture and print the path of every element `selector` matches.
fn run_query(dom: &Path, selector: &str) -> Result<()> {
    let json = fs::read_to_string(dom).with_context(|| format!("failed to read {}", dom.display()))?;
    let tree = DomTree::from_json(&json).with_context(|| format!("failed to load {}", dom.display()))?;
    let host = DomHost::new(&tree);

    let found = query(selector, &host).with_context(|| format!("query `{selector}` failed"))?;
    for element in &found {
        println!("{}", tree.describe_path(*element));
    }
    eprintln!("{} {} matches", "===".dimmed(), found.len());
    Ok(())
}
