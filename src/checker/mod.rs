// src/checker/mod.rs
// =============================================================================
// This module contains the page-level checking logic.
//
// Submodules:
// - scope: decides which URLs are in the checked subsection (normalizer)
// - links: turns a page's anchors into in-scope URLs
// - html: reads title, visible text, anchors and subresources from HTML
// - failure: the failure records we collect and print
// =============================================================================

mod failure;
mod html;
mod links;
mod scope;

pub use failure::{Failure, FailureKind};
pub use html::{parse_document, ParsedDocument};
pub use links::{extract_links, in_scope_links};
pub use scope::{Scope, ScopeError};
