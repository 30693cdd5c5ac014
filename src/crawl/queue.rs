// src/crawl/queue.rs
// =============================================================================
// This module implements the breadth-first crawl.
//
// How it works:
// 1. Start with the start URL in a queue
// 2. Before each page, stop if the queue is empty, the page ceiling is
//    reached, or the failure ceiling is reached
// 3. Take the next URL, skip it if already visited, otherwise mark visited
// 4. Subscribe to network events, navigate (with a timeout), wait the
//    settle delay, extract in-scope links, queue the unvisited ones
// 5. Drop the subscription and turn what it saw into failures
//
// Failures are recorded, never raised: one broken page does not stop the
// crawl. Only the failure ceiling ends it early.
//
// Rust concepts:
// - HashSet: To track visited URLs (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// - Generics: crawl_site works with any Page engine
// =============================================================================

use crate::browser::Page;
use crate::checker::{extract_links, Failure, Scope};
use crate::config::CrawlConfig;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// Why the crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Every reachable in-scope page was visited.
    QueueExhausted,
    /// The page ceiling was reached first.
    PageCeiling,
    /// The failure ceiling was reached first.
    FailureCeiling,
}

/// The outcome of one crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    /// Visited pages in visit order.
    pub visited: Vec<String>,
    pub failures: Vec<Failure>,
    pub stop_reason: StopReason,
}

impl CrawlReport {
    /// True when no failure was recorded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// Everything the crawl mutates, owned by one crawl_site call
struct CrawlState {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    visit_order: Vec<String>,
    failures: Vec<Failure>,
}

impl CrawlState {
    fn new(start_url: &str) -> Self {
        CrawlState {
            queue: VecDeque::from([start_url.to_string()]),
            visited: HashSet::new(),
            visit_order: Vec::new(),
            failures: Vec::new(),
        }
    }

    // Checked before every page, so a page that pushes the failure count past
    // the ceiling still has all of its failures recorded.
    fn stop_reason(&self, config: &CrawlConfig) -> Option<StopReason> {
        if self.queue.is_empty() {
            Some(StopReason::QueueExhausted)
        } else if self.visited.len() >= config.max_pages {
            Some(StopReason::PageCeiling)
        } else if self.failures.len() >= config.max_failures {
            Some(StopReason::FailureCeiling)
        } else {
            None
        }
    }

    fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.insert(url.to_string()) {
            self.visit_order.push(url.to_string());
            true
        } else {
            false
        }
    }

    fn into_report(self, start_url: &str, stop_reason: StopReason) -> CrawlReport {
        CrawlReport {
            start_url: start_url.to_string(),
            visited: self.visit_order,
            failures: self.failures,
            stop_reason,
        }
    }
}

/// Crawls the in-scope part of the site breadth-first from `start_url`,
/// recording every failed request, error response and failed navigation.
pub async fn crawl_site<P: Page>(
    page: &mut P,
    scope: &Scope,
    start_url: &str,
    config: &CrawlConfig,
) -> CrawlReport {
    let mut state = CrawlState::new(start_url);

    let stop_reason = loop {
        if let Some(reason) = state.stop_reason(config) {
            break reason;
        }
        let Some(raw) = state.queue.pop_front() else {
            break StopReason::QueueExhausted;
        };

        // Queued URLs are already normalized; only a start URL can fall back
        // to its raw form, and it is still marked visited exactly once.
        let url = scope.normalize(&raw).unwrap_or(raw);
        if !state.mark_visited(&url) {
            continue;
        }

        let (page_failures, links) = check_page(page, scope, &url, config).await;

        for link in links {
            if !state.visited.contains(&link) {
                state.queue.push_back(link);
            }
        }

        let new_failures = page_failures.len();
        state.failures.extend(page_failures);

        info!(
            visited = state.visited.len(),
            max_pages = config.max_pages,
            queue = state.queue.len(),
            new_failures,
            total_failures = state.failures.len(),
            url = %url,
            "[crawl]"
        );
    };

    if stop_reason != StopReason::QueueExhausted {
        warn!(?stop_reason, "crawl stopped early");
    }

    state.into_report(start_url, stop_reason)
}

// Loads one page and returns the failures attributed to it plus the in-scope
// links it contains (empty if the navigation failed).
async fn check_page<P: Page>(
    page: &mut P,
    scope: &Scope,
    url: &str,
    config: &CrawlConfig,
) -> (Vec<Failure>, Vec<String>) {
    let subscription = page.subscribe();

    let outcome: Result<Vec<String>, String> = async {
        match timeout(config.page_timeout, page.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => return Err(error.to_string()),
            Err(_) => {
                return Err(format!(
                    "navigation timed out after {}ms",
                    config.page_timeout.as_millis()
                ))
            }
        }

        // Lazily loaded resources keep requesting for a moment
        sleep(config.settle).await;

        extract_links(&*page, scope).await.map_err(|error| error.to_string())
    }
    .await;

    // Detach before reading: nothing after this point is attributed to `url`
    let events = subscription.close();

    let mut failures: Vec<Failure> = events
        .iter()
        .filter_map(|event| Failure::from_event(url, event))
        .collect();

    match outcome {
        Ok(links) => (failures, links),
        Err(error_text) => {
            failures.push(Failure::timeout(url, error_text));
            (failures, Vec::new())
        }
    }
}
