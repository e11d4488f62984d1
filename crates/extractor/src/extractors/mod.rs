// ABOUTME: Site-rule driven content extraction.
// ABOUTME: Rule data model, selector compilation, config loading and the DOM traversal itself.

//! Content extraction module.
//!
//! Submodules:
//! - `rules`: per-site rule data model and the hostname registry.
//! - `compiled`: rules with selectors parsed once at load time.
//! - `loader`: reading the registry from JSON.
//! - `content`: primary and fallback extraction over a parsed document.

pub mod compiled;
pub mod content;
pub mod loader;
pub mod rules;
