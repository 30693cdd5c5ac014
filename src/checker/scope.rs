// src/checker/scope.rs
// =============================================================================
// This module decides which URLs belong to the site subsection we check.
//
// A Scope is an origin (scheme + host + port) plus a path prefix, e.g.
//   origin = https://www.example.com
//   prefix = /tokyo/activity
//
// normalize() turns any href into the canonical form we use as a visit key:
// - relative references are resolved against the origin
// - anything on another origin, or outside the prefix, is rejected
// - query string and fragment are dropped, so "?a=1" and "#top" variants
//   of a page collapse into one visit
//
// Rust concepts:
// - Option<T>: "not applicable" is None, not an error
// - thiserror: typed errors for a bad start URL
// =============================================================================

use thiserror::Error;
use url::{Origin, Url};

/// Errors raised while building a [`Scope`] from user configuration.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("invalid start URL '{url}': {source}")]
    InvalidStartUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("start URL '{0}' has no host to crawl (only http/https sites are supported)")]
    OpaqueOrigin(String),

    #[error("path prefix '{0}' must start with '/'")]
    InvalidPrefix(String),

    #[error("start URL '{url}' is outside the path prefix '{prefix}'")]
    StartOutOfScope { url: String, prefix: String },
}

/// The origin and path prefix a crawl is allowed to visit.
#[derive(Debug, Clone)]
pub struct Scope {
    origin: Origin,
    // Root URL of the origin; relative hrefs are resolved against it.
    base: Url,
    prefix: String,
}

impl Scope {
    /// Builds a scope from the start URL. The prefix defaults to the start
    /// URL's own path, and the start URL must itself be in scope.
    pub fn from_start_url(start_url: &str, prefix: Option<&str>) -> Result<Self, ScopeError> {
        let start = Url::parse(start_url).map_err(|source| ScopeError::InvalidStartUrl {
            url: start_url.to_string(),
            source,
        })?;

        let origin = start.origin();
        if !origin.is_tuple() || !matches!(start.scheme(), "http" | "https") {
            return Err(ScopeError::OpaqueOrigin(start_url.to_string()));
        }

        let prefix = prefix.unwrap_or_else(|| start.path()).to_string();
        if !prefix.starts_with('/') {
            return Err(ScopeError::InvalidPrefix(prefix));
        }

        // Url::join on the bare origin gives us "https://host:port/"
        let base = Url::parse(&origin.ascii_serialization()).map_err(|source| {
            ScopeError::InvalidStartUrl {
                url: start_url.to_string(),
                source,
            }
        })?;

        let scope = Scope { origin, base, prefix };

        if scope.normalize(start_url).is_none() {
            return Err(ScopeError::StartOutOfScope {
                url: start_url.to_string(),
                prefix: scope.prefix,
            });
        }

        Ok(scope)
    }

    /// The allowed path prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The allowed origin, serialized as "scheme://host[:port]".
    pub fn origin(&self) -> String {
        self.origin.ascii_serialization()
    }

    /// Canonicalizes `raw` if it is in scope, or returns None.
    ///
    /// Idempotent: normalizing a normalized URL returns it unchanged.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut url = self.base.join(raw).ok()?;

        if url.origin() != self.origin {
            return None;
        }
        if !url.path().starts_with(&self.prefix) {
            return None;
        }

        url.set_query(None);
        url.set_fragment(None);
        Some(url.to_string())
    }

    /// Origin-only check, with no path prefix restriction.
    ///
    /// The smoke check uses this wider filter for resource failures so a
    /// broken shared asset elsewhere on the domain still shows up.
    pub fn is_same_origin(&self, raw: &str) -> bool {
        match Url::parse(raw) {
            Ok(url) => url.origin() == self.origin,
            Err(_) => false,
        }
    }
}
