// src/browser/scripted.rs
// A page engine driven by a fixed script, for unit tests of the crawl and
// smoke routines. No network, no timers except an explicit hang.

use super::{EventHub, NetworkEvent, Page, PageError, ResourceType, Subscription};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) enum Behaviour {
    Load,
    // Never finishes; the caller's timeout has to fire
    Hang,
    Fail(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ScriptedDocument {
    title: String,
    body_text: String,
    anchors: Vec<String>,
    // Published during goto, after the document response
    events: Vec<NetworkEvent>,
    behaviour: Behaviour,
}

impl ScriptedDocument {
    pub(crate) fn new(title: &str, body_text: &str) -> Self {
        ScriptedDocument {
            title: title.to_string(),
            body_text: body_text.to_string(),
            anchors: Vec::new(),
            events: Vec::new(),
            behaviour: Behaviour::Load,
        }
    }

    pub(crate) fn hanging() -> Self {
        ScriptedDocument {
            behaviour: Behaviour::Hang,
            ..Self::new("", "")
        }
    }

    pub(crate) fn failing(error: &str) -> Self {
        ScriptedDocument {
            behaviour: Behaviour::Fail(error.to_string()),
            ..Self::new("", "")
        }
    }

    pub(crate) fn links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anchors.extend(links.into_iter().map(Into::into));
        self
    }

    pub(crate) fn response(mut self, url: &str, status: u16, resource_type: ResourceType) -> Self {
        self.events.push(NetworkEvent::Response {
            url: url.to_string(),
            status,
            resource_type,
        });
        self
    }

    pub(crate) fn request_failed(mut self, url: &str, resource_type: ResourceType, error: &str) -> Self {
        self.events.push(NetworkEvent::RequestFailed {
            url: url.to_string(),
            resource_type,
            error_text: error.to_string(),
        });
        self
    }
}

#[derive(Default)]
pub(crate) struct ScriptedPage {
    hub: EventHub,
    documents: HashMap<String, ScriptedDocument>,
    current: Option<ScriptedDocument>,
    /// Every URL passed to goto, in order.
    pub(crate) navigations: Vec<String>,
}

impl ScriptedPage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, document: ScriptedDocument) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    fn loaded(&self) -> Result<&ScriptedDocument, PageError> {
        self.current.as_ref().ok_or(PageError::NotLoaded)
    }
}

impl Page for ScriptedPage {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    async fn goto(&mut self, url: &str) -> Result<(), PageError> {
        self.navigations.push(url.to_string());
        self.current = None;

        // Unknown URLs behave like a server answering 404 with an empty page
        let document = self
            .documents
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                ScriptedDocument::new("Not Found", "").response(url, 404, ResourceType::Document)
            });

        match &document.behaviour {
            Behaviour::Hang => std::future::pending::<()>().await,
            Behaviour::Fail(error) => {
                self.hub.publish(NetworkEvent::RequestFailed {
                    url: url.to_string(),
                    resource_type: ResourceType::Document,
                    error_text: error.clone(),
                });
                return Err(PageError::Engine(error.clone()));
            }
            Behaviour::Load => {}
        }

        let has_document_event = document.events.iter().any(|e| {
            e.url() == url
                && matches!(
                    e,
                    NetworkEvent::Response {
                        resource_type: ResourceType::Document,
                        ..
                    }
                )
        });
        if !has_document_event {
            self.hub.publish(NetworkEvent::Response {
                url: url.to_string(),
                status: 200,
                resource_type: ResourceType::Document,
            });
        }
        for event in &document.events {
            self.hub.publish(event.clone());
        }
        self.current = Some(document);
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self.loaded()?.title.clone())
    }

    async fn body_text(&self) -> Result<String, PageError> {
        Ok(self.loaded()?.body_text.clone())
    }

    async fn anchor_hrefs(&self) -> Result<Vec<String>, PageError> {
        Ok(self.loaded()?.anchors.clone())
    }
}
