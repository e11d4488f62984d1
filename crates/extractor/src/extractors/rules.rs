// ABOUTME: Per-domain selector rule data model and the immutable hostname registry.
// ABOUTME: SiteRule is the declarative JSON shape; SelectorConfig maps bare hostnames to compiled rules.

//! Site-specific selector rules.
//!
//! A [`SiteRule`] describes where article content lives on one site. Rules are
//! keyed by the bare host (no `www.` prefix) and compiled into a
//! [`CompiledRule`] when the [`SelectorConfig`] is built. The config is never
//! mutated afterwards, so it can be shared across tasks behind an `Arc`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extractors::compiled::CompiledRule;

/// Marker class of list labels stripped from list items when a rule does not name one.
pub const DEFAULT_LIST_LABEL_SELECTOR: &str = ".article__list-label";

fn default_list_label_selector() -> String {
    DEFAULT_LIST_LABEL_SELECTOR.to_string()
}

/// Declarative extraction rule for one hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRule {
    /// Container selectors in priority order; the first with a match wins.
    #[serde(default)]
    pub content_selectors: Vec<String>,
    /// Paragraphs inside the winning container.
    #[serde(default)]
    pub paragraph_selector: String,
    /// Elements searched over the whole document, regardless of containers.
    #[serde(default)]
    pub text_div_selector: String,
    /// Tables inside the winning container, kept as markup.
    #[serde(default)]
    pub table_selector: String,
    /// List items inside the winning container.
    #[serde(default)]
    pub list_item_selector: String,
    /// Label elements nested in list items whose text is removed from the item.
    #[serde(default = "default_list_label_selector")]
    pub list_label_selector: String,
}

impl Default for SiteRule {
    fn default() -> Self {
        Self {
            content_selectors: Vec::new(),
            paragraph_selector: String::new(),
            text_div_selector: String::new(),
            table_selector: String::new(),
            list_item_selector: String::new(),
            list_label_selector: default_list_label_selector(),
        }
    }
}

/// Immutable mapping from bare hostname to its compiled rule.
#[derive(Debug, Default, Clone)]
pub struct SelectorConfig {
    rules: HashMap<String, CompiledRule>,
}

impl SelectorConfig {
    /// Compiles every rule; any invalid selector fails the whole config.
    pub fn from_rules(rules: HashMap<String, SiteRule>) -> Result<Self, ConfigError> {
        let mut compiled = HashMap::with_capacity(rules.len());
        for (host, rule) in rules {
            if host.starts_with("www.") {
                tracing::warn!(host = %host, "selector rule keyed with www. prefix will never match");
            }
            let rule = CompiledRule::compile(&host, &rule)?;
            compiled.insert(host, rule);
        }
        Ok(Self { rules: compiled })
    }

    /// Looks up the rule for a bare hostname.
    pub fn lookup(&self, host: &str) -> Option<&CompiledRule> {
        self.rules.get(host)
    }

    /// Configured hostnames, in no particular order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Returns the number of configured hosts.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no hosts are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
