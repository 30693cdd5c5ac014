// src/lib.rs
// =============================================================================
// site-sentinel: crawl a website subsection and report broken links and
// failed resource loads.
//
// Modules:
// - browser: the Page trait, network events, and the HTTP page engine
// - checker: URL scope/normalization, link extraction, failure records
// - crawl:   the breadth-first crawl with page and failure ceilings
// - smoke:   the quick single-pass check
// - config:  run settings and their defaults
// - report:  text rendering of results
// =============================================================================

pub mod browser;
pub mod checker;
pub mod config;
pub mod crawl;
pub mod report;
pub mod smoke;
