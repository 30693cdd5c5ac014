// src/smoke/check.rs
// =============================================================================
// The smoke check: a quick single pass instead of a full crawl.
//
// 1. Subscribe once for the whole run, keeping only same-origin events
// 2. Open the start page: it must have a title and real body text
// 3. Take the first few in-scope links of the start page as samples
// 4. Open each sample with the same content checks
// 5. Fail if any same-origin resource failed along the way
//
// Unlike the crawl, a problem here ends the run immediately: a page with no
// content is reported before resource failures are even looked at.
// =============================================================================

use crate::browser::{Page, Subscription};
use crate::checker::{extract_links, Failure, Scope};
use crate::config::SmokeConfig;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::info;

/// The pages a successful smoke run looked at.
#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
    pub start_url: String,
    /// Start page first, then the sampled links in first-seen order.
    pub checked: Vec<String>,
    pub failures: Vec<Failure>,
}

/// Why a smoke run failed.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("could not load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("{url} has an empty title")]
    EmptyTitle { url: String },

    #[error("{url} shows {chars} characters of text, expected more than {min}")]
    ThinBody { url: String, chars: usize, min: usize },

    #[error("{} same-origin resource failure(s)", .report.failures.len())]
    ResourceFailures { report: SmokeReport },
}

/// Runs the smoke check from `start_url`.
pub async fn smoke_check<P: Page>(
    page: &mut P,
    scope: &Scope,
    start_url: &str,
    config: &SmokeConfig,
) -> Result<SmokeReport, SmokeError> {
    // One subscription for the whole run
    let mut subscription = page.subscribe();
    let mut report = SmokeReport {
        start_url: start_url.to_string(),
        checked: Vec::new(),
        failures: Vec::new(),
    };

    open_and_verify(page, start_url, config).await?;
    collect_failures(&mut subscription, scope, start_url, &mut report.failures);
    report.checked.push(start_url.to_string());

    let samples: Vec<String> = extract_links(&*page, scope)
        .await
        .map_err(|error| SmokeError::Navigation {
            url: start_url.to_string(),
            reason: error.to_string(),
        })?
        .into_iter()
        .take(config.sample_links)
        .collect();

    info!(samples = samples.len(), "[smoke] start page ok");

    for sample in samples {
        open_and_verify(page, &sample, config).await?;
        collect_failures(&mut subscription, scope, &sample, &mut report.failures);
        info!(url = %sample, "[smoke] ok");
        report.checked.push(sample);
    }

    drop(subscription);

    if !report.failures.is_empty() {
        return Err(SmokeError::ResourceFailures { report });
    }

    Ok(report)
}

// Navigates, waits the settle delay, then checks the page shows content
async fn open_and_verify<P: Page>(
    page: &mut P,
    url: &str,
    config: &SmokeConfig,
) -> Result<(), SmokeError> {
    let navigation_error = |reason: String| SmokeError::Navigation {
        url: url.to_string(),
        reason,
    };

    match timeout(config.page_timeout, page.goto(url)).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => return Err(navigation_error(error.to_string())),
        Err(_) => {
            return Err(navigation_error(format!(
                "navigation timed out after {}ms",
                config.page_timeout.as_millis()
            )))
        }
    }

    sleep(config.settle).await;

    let title = page
        .title()
        .await
        .map_err(|error| navigation_error(error.to_string()))?;
    if title.trim().is_empty() {
        return Err(SmokeError::EmptyTitle {
            url: url.to_string(),
        });
    }

    let body = page
        .body_text()
        .await
        .map_err(|error| navigation_error(error.to_string()))?;
    let chars = body.trim().chars().count();
    if chars <= config.min_body_chars {
        return Err(SmokeError::ThinBody {
            url: url.to_string(),
            chars,
            min: config.min_body_chars,
        });
    }

    Ok(())
}

// The subscription stays attached, so events are attributed to whichever
// page was opened last when they are read.
fn collect_failures(
    subscription: &mut Subscription,
    scope: &Scope,
    page_url: &str,
    failures: &mut Vec<Failure>,
) {
    failures.extend(
        subscription
            .drain()
            .iter()
            .filter(|event| scope.is_same_origin(event.url()))
            .filter_map(|event| Failure::from_event(page_url, event)),
    );
}
