// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: breadth-first crawl of the whole subsection
// - smoke: landing page plus a few sampled links
//
// Every tuning knob has a flag whose default matches src/config.rs.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use site_sentinel::config::{
    CrawlConfig, SmokeConfig, DEFAULT_CRAWL_DISPLAY_CAP, DEFAULT_MAX_FAILURES, DEFAULT_MAX_PAGES,
    DEFAULT_MIN_BODY_CHARS, DEFAULT_RESOURCE_CONCURRENCY, DEFAULT_SAMPLE_LINKS,
    DEFAULT_SMOKE_DISPLAY_CAP,
};
use std::time::Duration;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "site-sentinel",
    version,
    about = "Crawl a website subsection and report broken links and failed resource loads",
    long_about = "site-sentinel visits every page under a path prefix of one site, watches the \
                  network requests each page makes, and fails if any of them errored. \
                  It is meant to run in CI after a deploy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every in-scope page breadth-first and report all failures
    ///
    /// Example: site-sentinel crawl https://www.example.com/docs --max-pages 50
    Crawl(CrawlArgs),

    /// Check the start page and a few of its links for content and errors
    ///
    /// Example: site-sentinel smoke https://www.example.com/docs
    Smoke(SmokeArgs),
}

/// Arguments shared by both subcommands
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Start URL (e.g., https://www.example.com/docs)
    pub start_url: String,

    /// Only pages whose path starts with this prefix are followed
    /// (default: the start URL's path)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Output results in JSON format instead of text
    #[arg(long)]
    pub json: bool,

    /// How many images, scripts, stylesheets etc. of one page load at once
    #[arg(long, default_value_t = DEFAULT_RESOURCE_CONCURRENCY)]
    pub resource_concurrency: usize,
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Stop after visiting this many pages
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Stop once this many failures have been recorded
    #[arg(long, default_value_t = DEFAULT_MAX_FAILURES)]
    pub max_failures: usize,

    /// Timeout for loading one page, in milliseconds
    #[arg(long, default_value_t = 45_000)]
    pub page_timeout_ms: u64,

    /// Wait after each page load for late resource requests, in milliseconds
    #[arg(long, default_value_t = 1_500)]
    pub settle_ms: u64,

    /// How many failures to print
    #[arg(long, default_value_t = DEFAULT_CRAWL_DISPLAY_CAP)]
    pub display_cap: usize,
}

impl CrawlArgs {
    pub fn config(&self) -> CrawlConfig {
        CrawlConfig {
            max_pages: self.max_pages,
            max_failures: self.max_failures,
            page_timeout: Duration::from_millis(self.page_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            display_cap: self.display_cap,
        }
    }
}

#[derive(Args, Debug)]
pub struct SmokeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// How many in-scope links of the start page to check
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LINKS)]
    pub samples: usize,

    /// Timeout for loading one page, in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub page_timeout_ms: u64,

    /// Wait after each page load, in milliseconds
    #[arg(long, default_value_t = 800)]
    pub settle_ms: u64,

    /// A page must show more than this many characters of text
    #[arg(long, default_value_t = DEFAULT_MIN_BODY_CHARS)]
    pub min_body_chars: usize,

    /// How many failures to print
    #[arg(long, default_value_t = DEFAULT_SMOKE_DISPLAY_CAP)]
    pub display_cap: usize,
}

impl SmokeArgs {
    pub fn config(&self) -> SmokeConfig {
        SmokeConfig {
            sample_links: self.samples,
            page_timeout: Duration::from_millis(self.page_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            min_body_chars: self.min_body_chars,
            display_cap: self.display_cap,
        }
    }
}
