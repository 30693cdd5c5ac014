// src/report.rs
// =============================================================================
// Human-readable rendering of crawl and smoke results.
//
// The crawl report is a failure dump (capped) followed by a summary; the
// smoke report uses one line per failure. Both are plain text for CI logs.
// JSON output goes through serde directly and does not pass through here.
// =============================================================================

use crate::checker::{Failure, FailureKind};
use crate::crawl::{CrawlReport, StopReason};
use crate::smoke::SmokeReport;
use std::fmt::Write;

/// Renders the crawl result, listing at most `display_cap` failures.
pub fn render_crawl(report: &CrawlReport, display_cap: usize) -> String {
    let mut out = String::new();

    if !report.failures.is_empty() {
        let shown = report.failures.len().min(display_cap);
        let _ = writeln!(
            out,
            "==== FAILURES (first {} of {}) ====",
            shown,
            report.failures.len()
        );
        for failure in report.failures.iter().take(display_cap) {
            let _ = writeln!(out, "{}\n", failure);
        }
    }

    let _ = writeln!(out, "📊 Summary:");
    let _ = writeln!(
        out,
        "   📄 Visited: {} page(s) ({})",
        report.visited.len(),
        describe_stop(report.stop_reason)
    );
    let _ = writeln!(out, "   ❌ Failures: {}", report.failures.len());
    for kind in [FailureKind::HttpError, FailureKind::RequestFailed, FailureKind::Timeout] {
        let count = report.failures.iter().filter(|f| f.kind == kind).count();
        if count > 0 {
            let _ = writeln!(out, "      {}: {}", kind, count);
        }
    }

    out
}

/// Renders a smoke result (passing, or the report carried by a failure).
pub fn render_smoke(report: &SmokeReport, display_cap: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📄 Checked {} page(s):", report.checked.len());
    for url in &report.checked {
        let _ = writeln!(out, "   {}", url);
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "==== SAME-ORIGIN FAILURES ====");
        for failure in report.failures.iter().take(display_cap) {
            let _ = writeln!(out, "{}", smoke_line(failure));
        }
    }

    let _ = writeln!(out, "❌ Failures: {}", report.failures.len());
    out
}

/// One-line form used by the smoke check, e.g.
///   `- [http-error] 404 https://example.com/logo.png (image)`
///   `- [request-failed:net::ERR_FAILED] https://example.com/api (other)`
pub fn smoke_line(failure: &Failure) -> String {
    let resource_type = failure
        .resource_type
        .map(|t| t.to_string())
        .unwrap_or_default();

    match failure.kind {
        FailureKind::HttpError => format!(
            "- [http-error] {} {} ({})",
            failure.status.map(|s| s.to_string()).unwrap_or_default(),
            failure.resource_url,
            resource_type
        ),
        FailureKind::RequestFailed | FailureKind::Timeout => format!(
            "- [{}:{}] {} ({})",
            failure.kind,
            failure.error_text.as_deref().unwrap_or(""),
            failure.resource_url,
            resource_type
        ),
    }
}

fn describe_stop(reason: StopReason) -> &'static str {
    match reason {
        StopReason::QueueExhausted => "all reachable pages checked",
        StopReason::PageCeiling => "stopped at the page ceiling",
        StopReason::FailureCeiling => "stopped at the failure ceiling",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ResourceType;

    fn http_error(n: usize) -> Failure {
        Failure {
            page_url: "https://example.test/a".to_string(),
            resource_url: format!("https://example.test/img/{}.png", n),
            kind: FailureKind::HttpError,
            status: Some(404),
            resource_type: Some(ResourceType::Image),
            error_text: None,
        }
    }

    fn crawl_report(failures: Vec<Failure>) -> CrawlReport {
        CrawlReport {
            start_url: "https://example.test/a".to_string(),
            visited: vec!["https://example.test/a".to_string()],
            failures,
            stop_reason: StopReason::QueueExhausted,
        }
    }

    #[test]
    fn test_clean_crawl_has_no_failure_dump() {
        let text = render_crawl(&crawl_report(Vec::new()), 200);
        assert!(!text.contains("FAILURES"));
        assert!(text.contains("Visited: 1 page(s) (all reachable pages checked)"));
        assert!(text.contains("Failures: 0"));
    }

    #[test]
    fn test_failure_dump_respects_display_cap() {
        let failures = (0..5).map(http_error).collect();
        let text = render_crawl(&crawl_report(failures), 2);

        assert!(text.contains("==== FAILURES (first 2 of 5) ===="));
        assert!(text.contains("img/0.png"));
        assert!(text.contains("img/1.png"));
        assert!(!text.contains("img/2.png"));
        assert!(text.contains("http-error: 5"));
    }

    #[test]
    fn test_smoke_lines() {
        assert_eq!(
            smoke_line(&http_error(7)),
            "- [http-error] 404 https://example.test/img/7.png (image)"
        );

        let failed = Failure {
            kind: FailureKind::RequestFailed,
            status: None,
            resource_type: Some(ResourceType::Script),
            error_text: Some("net::ERR_FAILED".to_string()),
            ..http_error(1)
        };
        assert_eq!(
            smoke_line(&failed),
            "- [request-failed:net::ERR_FAILED] https://example.test/img/1.png (script)"
        );
    }
}
