// src/crawl/mod.rs
// =============================================================================
// This module handles the full crawl of the site subsection.
//
// Features:
// - Breadth-first crawling starting from a URL
// - Stays inside the allowed origin and path prefix
// - Page ceiling and failure ceiling as circuit breakers
// - Every failed resource and navigation is collected into one report
// =============================================================================

mod queue;

// Re-export the main crawling function and its report
pub use queue::{crawl_site, CrawlReport, StopReason};
