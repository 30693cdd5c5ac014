// src/checker/html.rs
// =============================================================================
// This module reads an HTML document the way a browser tab would see it.
//
// From one parse we pull out everything the checks need:
// - the document title
// - the visible body text (script/style contents excluded)
// - every anchor href, resolved to an absolute URL
// - every subresource the page would request (images, scripts, styles, ...)
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Relative URLs are resolved with the `url` crate against the document's
// base URL: the <base href> if there is one, otherwise the URL the document
// was served from (after redirects).
// =============================================================================

use crate::browser::ResourceType;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// The parts of a loaded document the checks care about.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub title: String,
    pub body_text: String,
    /// Resolved anchor hrefs in document order (duplicates kept).
    pub anchor_hrefs: Vec<String>,
    /// Subresources to load, deduplicated, in document order.
    pub subresources: Vec<(String, ResourceType)>,
}

const SUBRESOURCE_ELEMENTS: &str = "img[src], img[srcset], script[src], link[href], video[src], \
     video[poster], audio[src], source[src], source[srcset], track[src], iframe[src], embed[src]";

// Elements whose text never shows up on screen
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Parses `html` that was served from `document_url`.
pub fn parse_document(html: &str, document_url: &Url) -> ParsedDocument {
    let document = Html::parse_document(html);
    let base = document_base(&document, document_url);

    ParsedDocument {
        title: document_title(&document),
        body_text: visible_body_text(&document),
        anchor_hrefs: anchor_hrefs(&document, &base),
        subresources: subresources(&document, &base),
    }
}

// Runs a CSS selector, yielding nothing if the selector does not parse.
// All selectors in this file are constants, so that never happens in practice.
fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn document_base(document: &Html, document_url: &Url) -> Url {
    select(document, "base[href]")
        .first()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| document_url.join(href.trim()).ok())
        .unwrap_or_else(|| document_url.clone())
}

fn document_title(document: &Html) -> String {
    select(document, "title")
        .first()
        .map(|title| collapse_whitespace(title.text()))
        .unwrap_or_default()
}

// Approximates innerText: all text nodes under <body> that are not inside an
// element that never renders, with runs of whitespace collapsed.
fn visible_body_text(document: &Html) -> String {
    let Some(body) = select(document, "body").into_iter().next() else {
        return String::new();
    };

    let visible = body.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_TEXT_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            None
        } else {
            Some(&**text)
        }
    });

    collapse_whitespace(visible)
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in parts.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn anchor_hrefs(document: &Html, base: &Url) -> Vec<String> {
    select(document, "a[href]")
        .into_iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .filter_map(|href| resolve_url(base, href))
        .collect()
}

fn subresources(document: &Html, base: &Url) -> Vec<(String, ResourceType)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let mut push = |raw: Option<&str>, resource_type: ResourceType| {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return;
        };
        if let Some(url) = resolve_url(base, raw) {
            if is_checkable_link(&url) && seen.insert(url.clone()) {
                out.push((url, resource_type));
            }
        }
    };

    // Walk elements in document order so output order follows the markup
    for element in select(document, SUBRESOURCE_ELEMENTS) {
        let value = element.value();
        match value.name() {
            "img" => {
                push(value.attr("src"), ResourceType::Image);
                push(value.attr("srcset").and_then(first_srcset_candidate), ResourceType::Image);
            }
            "script" => push(value.attr("src"), ResourceType::Script),
            "video" => {
                push(value.attr("src"), ResourceType::Media);
                push(value.attr("poster"), ResourceType::Image);
            }
            "audio" => push(value.attr("src"), ResourceType::Media),
            // <source src> sits in <video>/<audio>, <source srcset> in <picture>
            "source" => {
                push(value.attr("src"), ResourceType::Media);
                push(value.attr("srcset").and_then(first_srcset_candidate), ResourceType::Image);
            }
            "iframe" => push(value.attr("src"), ResourceType::Document),
            "track" | "embed" => push(value.attr("src"), ResourceType::Other),
            "link" => {
                if let Some(resource_type) = link_resource_type(value.attr("rel"), value.attr("as")) {
                    push(value.attr("href"), resource_type);
                }
            }
            _ => {}
        }
    }

    out
}

// A browser fetches one candidate out of a srcset, so only the first is checked.
// "a.png 1x, b.png 2x" -> "a.png"
fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.split_whitespace().next()
}

// Maps <link rel=... as=...> to the request a browser would make, if any.
// Navigation hints (canonical, alternate, next, ...) are not requests.
fn link_resource_type(rel: Option<&str>, as_attr: Option<&str>) -> Option<ResourceType> {
    let rel = rel?.to_ascii_lowercase();
    let tokens: Vec<&str> = rel.split_whitespace().collect();

    if tokens.contains(&"stylesheet") {
        return Some(ResourceType::Stylesheet);
    }
    if tokens.contains(&"manifest") {
        return Some(ResourceType::Manifest);
    }
    if tokens.iter().any(|t| *t == "icon" || *t == "apple-touch-icon") {
        return Some(ResourceType::Other);
    }
    if tokens.contains(&"preload") {
        return Some(match as_attr.map(str::to_ascii_lowercase).as_deref() {
            Some("font") => ResourceType::Font,
            Some("script") => ResourceType::Script,
            Some("style") => ResourceType::Stylesheet,
            Some("image") => ResourceType::Image,
            Some("audio") | Some("video") => ResourceType::Media,
            _ => ResourceType::Other,
        });
    }
    None
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com" -> Some("https://other.com/")
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|url| url.to_string())
}

// Only http(s) URLs turn into network requests we can observe
fn is_checkable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
