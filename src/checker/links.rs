// src/checker/links.rs
// =============================================================================
// Link extraction: from a loaded page to the set of in-scope URLs it links to.
//
// Every anchor href goes through Scope::normalize. Out-of-scope and malformed
// hrefs are dropped silently (a bad link on the site is not a failure).
// The result is deduplicated and keeps first-seen order, so the same page
// always yields the same list.
// =============================================================================

use super::Scope;
use crate::browser::{Page, PageError};
use std::collections::HashSet;

/// Reads the anchors of the page's current document and returns the distinct
/// in-scope URLs they point to.
pub async fn extract_links<P: Page>(page: &P, scope: &Scope) -> Result<Vec<String>, PageError> {
    let hrefs = page.anchor_hrefs().await?;
    Ok(in_scope_links(&hrefs, scope))
}

/// Normalizes and deduplicates `hrefs`, keeping first-seen order.
pub fn in_scope_links<S: AsRef<str>>(hrefs: &[S], scope: &Scope) -> Vec<String> {
    let mut seen = HashSet::new();
    hrefs
        .iter()
        .filter_map(|href| scope.normalize(href.as_ref()))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
