// src/config.rs
// =============================================================================
// Run settings for the two checks, with their defaults.
//
// The defaults are safety valves sized for a subsection of roughly a hundred
// pages: a run stops early on a runaway site (page ceiling) or a badly broken
// one (failure ceiling) instead of hammering it.
// =============================================================================

use std::time::Duration;

pub const DEFAULT_MAX_PAGES: usize = 120;
pub const DEFAULT_MAX_FAILURES: usize = 30;
pub const DEFAULT_CRAWL_PAGE_TIMEOUT: Duration = Duration::from_millis(45_000);
pub const DEFAULT_CRAWL_SETTLE: Duration = Duration::from_millis(1_500);
pub const DEFAULT_CRAWL_DISPLAY_CAP: usize = 200;

pub const DEFAULT_SAMPLE_LINKS: usize = 3;
pub const DEFAULT_SMOKE_PAGE_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_SMOKE_SETTLE: Duration = Duration::from_millis(800);
pub const DEFAULT_MIN_BODY_CHARS: usize = 50;
pub const DEFAULT_SMOKE_DISPLAY_CAP: usize = 50;

// Browsers open about six connections per host
pub const DEFAULT_RESOURCE_CONCURRENCY: usize = 6;

/// Settings for the breadth-first crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Stop once this many pages have been visited.
    pub max_pages: usize,
    /// Stop once this many failures have been recorded.
    pub max_failures: usize,
    /// Bound on one navigation (document fetch and parse).
    pub page_timeout: Duration,
    /// Wait after each navigation so late resource requests are observed.
    pub settle: Duration,
    /// How many failures the report prints.
    pub display_cap: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            max_pages: DEFAULT_MAX_PAGES,
            max_failures: DEFAULT_MAX_FAILURES,
            page_timeout: DEFAULT_CRAWL_PAGE_TIMEOUT,
            settle: DEFAULT_CRAWL_SETTLE,
            display_cap: DEFAULT_CRAWL_DISPLAY_CAP,
        }
    }
}

/// Settings for the single-pass smoke check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeConfig {
    /// How many in-scope links of the start page to visit.
    pub sample_links: usize,
    pub page_timeout: Duration,
    pub settle: Duration,
    /// A page passes only if its visible text is longer than this.
    pub min_body_chars: usize,
    pub display_cap: usize,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        SmokeConfig {
            sample_links: DEFAULT_SAMPLE_LINKS,
            page_timeout: DEFAULT_SMOKE_PAGE_TIMEOUT,
            settle: DEFAULT_SMOKE_SETTLE,
            min_body_chars: DEFAULT_MIN_BODY_CHARS,
            display_cap: DEFAULT_SMOKE_DISPLAY_CAP,
        }
    }
}
