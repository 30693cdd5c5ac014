// src/checker/failure.rs
// =============================================================================
// This module defines what a "failure" is and how network events become one.
//
// Three kinds of failure exist:
// - http-error:      a response arrived with status >= 400
// - request-failed:  the request never got a response (DNS, reset, ...)
// - timeout:         navigating to the page itself did not complete
//
// Failures are plain data: once created they are only collected and printed.
// =============================================================================

use crate::browser::{NetworkEvent, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    HttpError,
    RequestFailed,
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::HttpError => "http-error",
            FailureKind::RequestFailed => "request-failed",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded failure, keyed to the page that was being checked when it
/// happened (not necessarily the resource that failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub page_url: String,
    pub resource_url: String,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl Failure {
    /// Classifies a network event observed while `page_url` was loading.
    ///
    /// Successful responses (status < 400) are not failures and yield None.
    pub fn from_event(page_url: &str, event: &NetworkEvent) -> Option<Failure> {
        match event {
            NetworkEvent::Response {
                url,
                status,
                resource_type,
            } if *status >= 400 => Some(Failure {
                page_url: page_url.to_string(),
                resource_url: url.clone(),
                kind: FailureKind::HttpError,
                status: Some(*status),
                resource_type: Some(*resource_type),
                error_text: None,
            }),
            NetworkEvent::Response { .. } => None,
            NetworkEvent::RequestFailed {
                url,
                resource_type,
                error_text,
            } => Some(Failure {
                page_url: page_url.to_string(),
                resource_url: url.clone(),
                kind: FailureKind::RequestFailed,
                status: None,
                resource_type: Some(*resource_type),
                error_text: Some(error_text.clone()),
            }),
        }
    }

    /// A navigation that did not complete. The page is its own resource.
    pub fn timeout(page_url: &str, error_text: impl Into<String>) -> Failure {
        Failure {
            page_url: page_url.to_string(),
            resource_url: page_url.to_string(),
            kind: FailureKind::Timeout,
            status: None,
            resource_type: None,
            error_text: Some(error_text.into()),
        }
    }
}

// Renders the three-line block used in the failure dump:
//   - [http-error] page=https://example.com/a
//     resource=https://example.com/a/img.png
//     status=404 type=image err=
impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status.map(|s| s.to_string()).unwrap_or_default();
        let resource_type = self
            .resource_type
            .map(|t| t.to_string())
            .unwrap_or_default();
        let error_text = self.error_text.as_deref().unwrap_or("");

        writeln!(f, "- [{}] page={}", self.kind, self.page_url)?;
        writeln!(f, "  resource={}", self.resource_url)?;
        write!(f, "  status={} type={} err={}", status, resource_type, error_text)
    }
}
