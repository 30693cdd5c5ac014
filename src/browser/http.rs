// src/browser/http.rs
// =============================================================================
// A page engine built on an HTTP client and an HTML parser.
//
// Navigation works like a browser without JavaScript:
// 1. GET the document (redirects followed)
// 2. Publish a Response event for it (or RequestFailed if it never arrived)
// 3. Parse it: title, visible text, anchors, subresources
// 4. Start loading the subresources in a background task, publishing one
//    event per request as each finishes
//
// goto() returns after step 3, the equivalent of "DOM content loaded". Step 4
// keeps running while the caller waits out its settle delay. The next goto()
// cancels whatever is still loading from the previous page, and each request
// it cuts off is published as a RequestFailed event, the way a browser
// reports an aborted load.
//
// Rust concepts:
// - tokio::spawn + JoinHandle::abort: background work we can cancel
// - buffer_unordered: bounded concurrency over a stream of futures
// - Arc<Mutex<..>>: the in-flight list, shared by the task and the page
// =============================================================================

use super::{EventHub, NetworkEvent, Page, PageError, ResourceType, Subscription};
use crate::checker::{parse_document, ParsedDocument};
use crate::config::DEFAULT_RESOURCE_CONCURRENCY;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("site-sentinel/", env!("CARGO_PKG_VERSION"));
const ABORTED_BY_NAVIGATION: &str = "aborted by navigation";

// Subresource requests that have started but not yet been published
#[derive(Clone)]
struct InFlight(Arc<Mutex<Vec<(String, ResourceType)>>>);

impl InFlight {
    fn new(resources: &[(String, ResourceType)]) -> Self {
        InFlight(Arc::new(Mutex::new(resources.to_vec())))
    }

    // Entries are only added or removed whole, so a poisoned lock is usable
    fn lock(&self) -> MutexGuard<'_, Vec<(String, ResourceType)>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// The background task of one navigation
struct PendingLoads {
    task: JoinHandle<()>,
    in_flight: InFlight,
}

/// The built-in page engine.
pub struct HttpPage {
    client: Client,
    hub: EventHub,
    document: Option<ParsedDocument>,
    // Subresource loads started by the last navigation
    pending: Option<PendingLoads>,
    resource_concurrency: usize,
    resource_timeout: Duration,
}

impl HttpPage {
    /// Creates an engine with its own HTTP client.
    pub fn new() -> Result<Self, PageError> {
        // No client-wide timeout: the caller bounds each navigation, and
        // subresources get their own per-request timeout.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Creates an engine that shares an existing client.
    pub fn with_client(client: Client) -> Self {
        HttpPage {
            client,
            hub: EventHub::new(),
            document: None,
            pending: None,
            resource_concurrency: DEFAULT_RESOURCE_CONCURRENCY,
            resource_timeout: DEFAULT_RESOURCE_TIMEOUT,
        }
    }

    /// Caps how many subresources of one page load at the same time.
    pub fn with_resource_concurrency(mut self, concurrency: usize) -> Self {
        self.resource_concurrency = concurrency.max(1);
        self
    }

    pub fn with_resource_timeout(mut self, timeout: Duration) -> Self {
        self.resource_timeout = timeout;
        self
    }

    /// Waits for the subresources of the current page to finish loading.
    pub async fn wait_for_resources(&mut self) {
        if let Some(pending) = self.pending.take() {
            // An aborted or panicked loader just means fewer events
            let _ = pending.task.await;
        }
    }

    // Publishes a failure for every request still loading, then stops the task.
    // The task publishes under the same lock, so each request is reported once.
    fn cancel_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let aborted: Vec<_> = pending.in_flight.lock().drain(..).collect();
        if !aborted.is_empty() {
            debug!(requests = aborted.len(), "aborting unfinished subresource loads");
        }
        for (url, resource_type) in aborted {
            self.hub.publish(NetworkEvent::RequestFailed {
                url,
                resource_type,
                error_text: ABORTED_BY_NAVIGATION.to_string(),
            });
        }

        pending.task.abort();
    }

    fn loaded(&self) -> Result<&ParsedDocument, PageError> {
        self.document.as_ref().ok_or(PageError::NotLoaded)
    }

    async fn load_document(&self, target: Url) -> Result<ParsedDocument, PageError> {
        let requested = target.to_string();

        let response = match self.client.get(target).send().await {
            Ok(response) => response,
            Err(error) => {
                self.hub.publish(NetworkEvent::RequestFailed {
                    url: requested,
                    resource_type: ResourceType::Document,
                    error_text: describe_error(&error),
                });
                return Err(error.into());
            }
        };

        let final_url = response.url().clone();
        self.hub.publish(NetworkEvent::Response {
            url: final_url.to_string(),
            status: response.status().as_u16(),
            resource_type: ResourceType::Document,
        });

        // The response headers arrived, but the body can still break off
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                self.hub.publish(NetworkEvent::RequestFailed {
                    url: final_url.to_string(),
                    resource_type: ResourceType::Document,
                    error_text: describe_error(&error),
                });
                return Err(error.into());
            }
        };

        Ok(parse_document(&body, &final_url))
    }
}

impl Page for HttpPage {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    async fn goto(&mut self, url: &str) -> Result<(), PageError> {
        self.cancel_pending();
        self.document = None;

        let target = Url::parse(url).map_err(|source| PageError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let document = self.load_document(target).await?;

        debug!(
            url,
            subresources = document.subresources.len(),
            anchors = document.anchor_hrefs.len(),
            "document parsed"
        );

        let in_flight = InFlight::new(&document.subresources);
        let task = tokio::spawn(load_subresources(
            self.client.clone(),
            self.hub.clone(),
            in_flight.clone(),
            document.subresources.clone(),
            self.resource_concurrency,
            self.resource_timeout,
        ));
        self.pending = Some(PendingLoads { task, in_flight });
        self.document = Some(document);
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self.loaded()?.title.clone())
    }

    async fn body_text(&self) -> Result<String, PageError> {
        Ok(self.loaded()?.body_text.clone())
    }

    async fn anchor_hrefs(&self) -> Result<Vec<String>, PageError> {
        Ok(self.loaded()?.anchor_hrefs.clone())
    }
}

impl Drop for HttpPage {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

// Loads every subresource with bounded concurrency, publishing as they finish.
// A request already reported as aborted is not published a second time.
async fn load_subresources(
    client: Client,
    hub: EventHub,
    in_flight: InFlight,
    resources: Vec<(String, ResourceType)>,
    concurrency: usize,
    timeout: Duration,
) {
    let fetches = resources.into_iter().map(|(url, resource_type)| {
        let client = client.clone();
        async move {
            let event = fetch_resource(&client, url.clone(), resource_type, timeout).await;
            (url, event)
        }
    });

    let mut events = stream::iter(fetches).buffer_unordered(concurrency);
    while let Some((requested, event)) = events.next().await {
        let mut unfinished = in_flight.lock();
        if let Some(index) = unfinished.iter().position(|(url, _)| *url == requested) {
            unfinished.swap_remove(index);
            hub.publish(event);
        }
    }
}

async fn fetch_resource(
    client: &Client,
    url: String,
    resource_type: ResourceType,
    timeout: Duration,
) -> NetworkEvent {
    match client.get(&url).timeout(timeout).send().await {
        Ok(response) => NetworkEvent::Response {
            url: response.url().to_string(),
            status: response.status().as_u16(),
            resource_type,
        },
        Err(error) => NetworkEvent::RequestFailed {
            url,
            resource_type,
            error_text: describe_error(&error),
        },
    }
}

// Turns a reqwest error into the short reason shown in failure reports.
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();
    // The cause chain has the detail; the top-level message may repeat it
    let detail = std::iter::successors(std::error::Error::source(error), |e| (*e).source())
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ");
    let cause = detail.to_lowercase();

    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if cause.contains("dns") || cause.contains("failed to lookup address") {
        "Could not resolve hostname".to_string()
    } else if cause.contains("certificate") || cause.contains("ssl") || cause.contains("tls") {
        "SSL certificate error".to_string()
    } else if error.is_connect() {
        if detail.is_empty() {
            "Connection failed".to_string()
        } else {
            format!("Connection failed: {}", detail)
        }
    } else if detail.is_empty() || error_string.contains(&detail) {
        error_string
    } else {
        format!("{}: {}", error_string, detail)
    }
}
