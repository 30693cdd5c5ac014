// src/smoke/mod.rs
// =============================================================================
// This module handles the reduced, single-pass smoke check: the landing page
// plus a small sample of its links, checked for real content and for failed
// same-origin resources.
// =============================================================================

mod check;

pub use check::{smoke_check, SmokeError, SmokeReport};
