// src/browser/mod.rs
// =============================================================================
// This module is the narrow "browser" surface the checks depend on.
//
// A Page can:
// - navigate to a URL (load the document, start loading its resources)
// - report the title, visible text and anchor hrefs of the loaded document
// - publish every network response / failed request it sees to subscribers
//
// The crawl and smoke routines are generic over the Page trait, so they do
// not care whether the engine is the built-in HTTP engine (http.rs), a
// scripted engine in tests, or something else entirely.
//
// Submodules:
// - events: fan-out of network events to scoped subscriptions
// - http: the reqwest + scraper engine
// =============================================================================

mod events;
mod http;

pub use events::{EventHub, Subscription};
pub use http::HttpPage;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What kind of resource a request was for, as a browser would classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Manifest,
    Other,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Document => "document",
            ResourceType::Stylesheet => "stylesheet",
            ResourceType::Image => "image",
            ResourceType::Media => "media",
            ResourceType::Font => "font",
            ResourceType::Script => "script",
            ResourceType::Manifest => "manifest",
            ResourceType::Other => "other",
        };
        f.write_str(name)
    }
}

/// One observation from the page's network activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A response was received (any status).
    Response {
        url: String,
        status: u16,
        resource_type: ResourceType,
    },
    /// The request failed before a response arrived.
    RequestFailed {
        url: String,
        resource_type: ResourceType,
        error_text: String,
    },
}

impl NetworkEvent {
    /// The URL of the resource the event is about.
    pub fn url(&self) -> &str {
        match self {
            NetworkEvent::Response { url, .. } | NetworkEvent::RequestFailed { url, .. } => url,
        }
    }
}

/// Errors a page engine can raise while navigating or reading the document.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no document has been loaded yet")]
    NotLoaded,

    #[error("{0}")]
    Engine(String),
}

/// The capability surface of a browser tab.
///
/// Navigations are sequential: callers await one `goto` before starting the
/// next. Timeouts are applied by the caller around `goto`.
#[allow(async_fn_in_trait)]
pub trait Page {
    /// Registers a subscription that receives every network event published
    /// from now until the returned handle is dropped.
    fn subscribe(&self) -> Subscription;

    /// Loads `url` and returns once the document has been parsed. Resource
    /// loads the document triggers may still be in flight afterwards.
    async fn goto(&mut self, url: &str) -> Result<(), PageError>;

    /// The document title, whitespace collapsed.
    async fn title(&self) -> Result<String, PageError>;

    /// The visible text of the document body, whitespace collapsed.
    async fn body_text(&self) -> Result<String, PageError>;

    /// Every anchor's resolved href, in document order.
    async fn anchor_hrefs(&self) -> Result<Vec<String>, PageError>;
}

#[cfg(test)]
pub(crate) mod scripted;
