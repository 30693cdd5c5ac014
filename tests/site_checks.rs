// End-to-end checks of the HTTP page engine against a local fixture site.

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use std::collections::HashSet;
use std::time::Duration;

use site_sentinel::browser::{HttpPage, Page};
use site_sentinel::checker::{FailureKind, Scope};
use site_sentinel::config::{CrawlConfig, SmokeConfig};
use site_sentinel::crawl::{crawl_site, StopReason};
use site_sentinel::smoke::{smoke_check, SmokeError};

const FILLER: &str = "This page has enough visible text to count as real content for the smoke check.";

fn html_page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        title, FILLER, body
    ))
}

fn png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8, b'P', b'N', b'G'])
}

// /docs           -> links to a, b (with query), an outside path and another host;
//                    loads a good and a missing image
// /docs/a         -> links back, loads a script
// /docs/b         -> links to a page that does not exist
// /docs/old       -> redirects to /docs/a
fn broken_site() -> Router {
    Router::new()
        .route(
            "/docs",
            get(|| async {
                html_page(
                    "Docs",
                    r#"<a href="/docs/a">A</a>
                       <a href="/docs/b?ref=home">B</a>
                       <a href="/blog">Blog</a>
                       <a href="http://external.invalid/x">External</a>
                       <img src="/static/logo.png"><img src="/static/missing.png">"#,
                )
            }),
        )
        .route(
            "/docs/a",
            get(|| async {
                html_page(
                    "A",
                    r#"<a href="/docs">Home</a><a href="/docs/b#top">B</a>
                       <script src="/static/app.js"></script>"#,
                )
            }),
        )
        .route(
            "/docs/b",
            get(|| async { html_page("B", r#"<a href="/docs/gone">Gone</a>"#) }),
        )
        .route("/docs/old", get(|| async { Redirect::permanent("/docs/a") }))
        .route("/static/logo.png", get(|| async { png() }))
        .route("/static/app.js", get(|| async { "console.log(1)" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "not found") })
}

fn healthy_site() -> Router {
    Router::new()
        .route(
            "/docs",
            get(|| async { html_page("Docs", r#"<a href="/docs/a">A</a><img src="/static/logo.png">"#) }),
        )
        .route("/docs/a", get(|| async { html_page("A", "") }))
        .route(
            "/docs/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                html_page("Slow", "")
            }),
        )
        .route("/static/logo.png", get(|| async { png() }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "not found") })
}

// /docs loads an image that answers 404 only after the smoke settle delay
fn slow_image_site() -> Router {
    Router::new()
        .route(
            "/docs",
            get(|| async { html_page("Docs", r#"<a href="/docs/a">A</a><img src="/static/slow.png">"#) }),
        )
        .route("/docs/a", get(|| async { html_page("A", "") }))
        .route(
            "/static/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                (StatusCode::NOT_FOUND, "not found")
            }),
        )
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn page() -> HttpPage {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpPage::with_client(client).with_resource_timeout(Duration::from_secs(5))
}

fn crawl_config() -> CrawlConfig {
    CrawlConfig {
        page_timeout: Duration::from_secs(5),
        settle: Duration::from_millis(500),
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn test_crawl_finds_broken_resources_and_pages() {
    let origin = serve(broken_site()).await;
    let start = format!("{}/docs", origin);
    let scope = Scope::from_start_url(&start, None).unwrap();

    let report = crawl_site(&mut page(), &scope, &start, &crawl_config()).await;

    let visited: HashSet<_> = report.visited.iter().cloned().collect();
    let expected: HashSet<_> = ["/docs", "/docs/a", "/docs/b", "/docs/gone"]
        .iter()
        .map(|path| format!("{}{}", origin, path))
        .collect();
    assert_eq!(visited, expected);
    assert_eq!(report.visited[0], start);
    assert_eq!(report.stop_reason, StopReason::QueueExhausted);

    assert_eq!(report.failures.len(), 2, "{:#?}", report.failures);

    let image = report
        .failures
        .iter()
        .find(|f| f.resource_url.ends_with("/static/missing.png"))
        .expect("missing image is reported");
    assert_eq!(image.kind, FailureKind::HttpError);
    assert_eq!(image.page_url, start);
    assert_eq!(image.status, Some(404));

    let gone = format!("{}/docs/gone", origin);
    let document = report
        .failures
        .iter()
        .find(|f| f.resource_url == gone)
        .expect("missing page is reported");
    assert_eq!(document.page_url, gone);
    assert_eq!(document.status, Some(404));
}

#[tokio::test]
async fn test_crawl_records_navigation_timeout() {
    let origin = serve(healthy_site()).await;
    let start = format!("{}/docs/slow", origin);
    let scope = Scope::from_start_url(&start, Some("/docs")).unwrap();
    let config = CrawlConfig {
        page_timeout: Duration::from_millis(200),
        ..crawl_config()
    };

    let report = crawl_site(&mut page(), &scope, &start, &config).await;

    assert_eq!(report.visited, vec![start.clone()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Timeout);
    assert_eq!(report.failures[0].resource_url, start);
}

#[tokio::test]
async fn test_crawl_records_unreachable_site() {
    // Grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let start = format!("http://{}/docs", listener.local_addr().unwrap());
    drop(listener);
    let scope = Scope::from_start_url(&start, None).unwrap();

    let report = crawl_site(&mut page(), &scope, &start, &crawl_config()).await;

    let kinds: Vec<_> = report.failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FailureKind::RequestFailed, FailureKind::Timeout]);
}

#[tokio::test]
async fn test_smoke_passes_on_healthy_site() {
    let origin = serve(healthy_site()).await;
    let start = format!("{}/docs", origin);
    let scope = Scope::from_start_url(&start, None).unwrap();
    let config = SmokeConfig {
        settle: Duration::from_millis(300),
        ..SmokeConfig::default()
    };

    let report = smoke_check(&mut page(), &scope, &start, &config).await.unwrap();

    assert_eq!(report.checked, vec![start, format!("{}/docs/a", origin)]);
}

#[tokio::test]
async fn test_smoke_reports_same_origin_failures() {
    let origin = serve(broken_site()).await;
    let start = format!("{}/docs", origin);
    let scope = Scope::from_start_url(&start, None).unwrap();
    let config = SmokeConfig {
        settle: Duration::from_millis(300),
        ..SmokeConfig::default()
    };

    let error = smoke_check(&mut page(), &scope, &start, &config).await.unwrap_err();

    let report = match error {
        SmokeError::ResourceFailures { report } => report,
        other => panic!("expected resource failures, got {}", other),
    };
    assert_eq!(report.checked.len(), 3);
    assert!(report
        .failures
        .iter()
        .any(|f| f.resource_url.ends_with("/static/missing.png")));
}

#[tokio::test]
async fn test_smoke_reports_loads_cut_off_by_navigation() {
    let origin = serve(slow_image_site()).await;
    let start = format!("{}/docs", origin);
    let scope = Scope::from_start_url(&start, None).unwrap();

    let error = smoke_check(&mut page(), &scope, &start, &SmokeConfig::default())
        .await
        .unwrap_err();

    let report = match error {
        SmokeError::ResourceFailures { report } => report,
        other => panic!("expected resource failures, got {}", other),
    };
    assert_eq!(report.failures.len(), 1, "{:#?}", report.failures);
    let failure = &report.failures[0];
    assert_eq!(failure.resource_url, format!("{}/static/slow.png", origin));
    assert_eq!(failure.kind, FailureKind::RequestFailed);
    assert_eq!(failure.error_text.as_deref(), Some("aborted by navigation"));
}

#[tokio::test]
async fn test_engine_follows_redirects() {
    let origin = serve(broken_site()).await;
    let mut page = page();
    let mut subscription = page.subscribe();

    page.goto(&format!("{}/docs/old", origin)).await.unwrap();
    page.wait_for_resources().await;

    assert_eq!(page.title().await.unwrap(), "A");
    let events = subscription.drain();
    assert_eq!(events[0].url(), format!("{}/docs/a", origin));
    assert!(page
        .anchor_hrefs()
        .await
        .unwrap()
        .contains(&format!("{}/docs", origin)));
}
