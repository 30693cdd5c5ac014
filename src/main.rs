// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the crawl or smoke handler
// 4. Print the report
// 5. Exit with proper code (0 = clean, 1 = failures found, 2 = error)
// =============================================================================

mod cli;

use clap::Parser;
use cli::{Cli, Commands, CrawlArgs, SmokeArgs};
use site_sentinel::browser::HttpPage;
use site_sentinel::checker::Scope;
use site_sentinel::crawl::crawl_site;
use site_sentinel::report::{render_crawl, render_smoke};
use site_sentinel::smoke::{smoke_check, SmokeError};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Configuration problems and other unexpected errors
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = no failures
//   Ok(1) = failures found / smoke check failed
//   Err   = configuration or internal error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
        Commands::Smoke(args) => handle_smoke(args).await,
    }
}

async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    let target = &args.target;
    let scope = Scope::from_start_url(&target.start_url, target.prefix.as_deref())
        .context("invalid crawl target")?;
    let config = args.config();

    info!(
        "🔍 Crawling {} (origin {}, prefix {}, max {} pages)",
        target.start_url,
        scope.origin(),
        scope.prefix(),
        config.max_pages
    );

    let mut page = HttpPage::new()
        .context("failed to create the HTTP client")?
        .with_resource_concurrency(target.resource_concurrency);
    let report = crawl_site(&mut page, &scope, &target.start_url, &config).await;

    if target.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_crawl(&report, config.display_cap));
    }

    if report.is_clean() {
        Ok(0)
    } else {
        eprintln!("❌ {} resource failure(s) found", report.failures.len());
        Ok(1)
    }
}

async fn handle_smoke(args: SmokeArgs) -> Result<i32> {
    let target = &args.target;
    let scope = Scope::from_start_url(&target.start_url, target.prefix.as_deref())
        .context("invalid smoke target")?;
    let config = args.config();

    info!("🔍 Smoke checking {}", target.start_url);

    let mut page = HttpPage::new()
        .context("failed to create the HTTP client")?
        .with_resource_concurrency(target.resource_concurrency);

    match smoke_check(&mut page, &scope, &target.start_url, &config).await {
        Ok(report) => {
            if target.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_smoke(&report, config.display_cap));
                println!("✅ Smoke check passed");
            }
            Ok(0)
        }
        Err(SmokeError::ResourceFailures { report }) => {
            if target.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_smoke(&report, config.display_cap));
            }
            eprintln!("❌ {} same-origin resource failure(s)", report.failures.len());
            Ok(1)
        }
        Err(error) => {
            if target.json {
                let output = serde_json::json!({
                    "start_url": target.start_url,
                    "error": error.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            eprintln!("❌ Smoke check failed: {}", error);
            Ok(1)
        }
    }
}
