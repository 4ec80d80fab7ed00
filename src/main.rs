// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr so stdout stays clean for results)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the inaccessible links as a table or JSON
// 5. Exit with proper code (0 = all good, 1 = broken links, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{CheckOptions, Cli, Commands, LogFormat};
use link_sentry::check_links;
use link_sentry::models::{Link, LinkError, PageReport};
use link_sentry::page::{self, PageOptions};
use std::collections::HashSet;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "link check aborted");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG controls verbosity, info by default
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = could not run the check at all
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check { urls, options } => handle_check(urls, &options).await,
        Commands::Page {
            url,
            request_timeout_ms,
            max_response_size,
            options,
        } => {
            let page_options = cli::page_options(request_timeout_ms, max_response_size);
            handle_page(&url, &page_options, &options).await
        }
    }
}

// Handles the 'check' subcommand
async fn handle_check(urls: Vec<String>, options: &CheckOptions) -> Result<i32> {
    // Remove duplicates but keep the order the user gave
    let mut seen = HashSet::new();
    let links: Vec<Link> = urls
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .map(Link::standalone)
        .collect();

    if !options.json {
        println!("🌐 Checking {} unique link(s)...\n", links.len());
    }

    let errors = check_links(&links, &options.check_config()).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&errors)?);
    } else {
        print_table(&errors);
        print_summary(links.len(), errors.len());
    }

    Ok(exit_code(&errors))
}

// Handles the 'page' subcommand
async fn handle_page(url: &str, page_options: &PageOptions, options: &CheckOptions) -> Result<i32> {
    if !options.json {
        println!("🔍 Analyzing page: {}", url);
    }

    let report = page::analyze_page(url, page_options, &options.check_config()).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(exit_code(&report.inaccessible_links))
}

fn exit_code(errors: &[LinkError]) -> i32 {
    if errors.is_empty() {
        0
    } else {
        1
    }
}

fn print_report(report: &PageReport) {
    println!("📄 Title: {}", report.title);
    println!("📄 HTML version: {}", report.html_version);

    // BTreeMap iterates h1..h6 in order
    let headings: Vec<String> = report
        .headings
        .iter()
        .map(|(level, count)| format!("{level}: {count}"))
        .collect();
    println!("📄 Headings: {}", headings.join(", "));

    let login = if report.has_login_form { "yes" } else { "no" };
    println!("📄 Login form: {}", login);
    println!("📄 Internal links: {}", report.internal_links);
    println!("📄 External links: {}", report.external_links);
    println!();
    print_table(&report.inaccessible_links);
    print_summary(
        report.internal_links + report.external_links,
        report.inaccessible_links.len(),
    );
}

// Prints inaccessible links as a human-readable table
fn print_table(errors: &[LinkError]) {
    if errors.is_empty() {
        println!("✅ No inaccessible links");
        println!();
        return;
    }

    println!("{:<60} {:<8} {:<40}", "URL", "STATUS", "ERROR");
    println!("{}", "=".repeat(108));

    for error in errors {
        // Truncate URL if too long for display
        let url_display = if error.url.chars().count() > 57 {
            format!("{}...", error.url.chars().take(57).collect::<String>())
        } else {
            error.url.clone()
        };
        let status = if error.status_code == 0 {
            "-".to_string()
        } else {
            error.status_code.to_string()
        };

        println!("{:<60} {:<8} {:<40}", url_display, status, error.error);
    }

    println!();
}

fn print_summary(total: usize, broken: usize) {
    println!("📊 Summary:");
    println!("   ❌ Inaccessible: {}", broken);
    println!("   📋 Total: {}", total);
}
