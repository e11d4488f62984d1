// ABOUTME: Selector rules with their CSS selectors parsed once at config load time.
// ABOUTME: Eliminates repeated selector parsing on the per-record extraction path.

use scraper::Selector;

use crate::error::ConfigError;
use crate::extractors::rules::SiteRule;

/// A parsed CSS selector together with its source text.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    css: String,
    selector: Selector,
}

impl CompiledSelector {
    /// Parses `css`. Returns `Ok(None)` for an empty string, which matches nothing.
    pub fn parse(host: &str, css: &str) -> Result<Option<Self>, ConfigError> {
        let trimmed = css.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let selector = Selector::parse(trimmed).map_err(|e| ConfigError::Selector {
            host: host.to_string(),
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Self {
            css: trimmed.to_string(),
            selector,
        }))
    }

    /// The selector source text.
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// A [`SiteRule`] with every selector compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub containers: Vec<CompiledSelector>,
    pub paragraph: Option<CompiledSelector>,
    pub text_div: Option<CompiledSelector>,
    pub table: Option<CompiledSelector>,
    pub list_item: Option<CompiledSelector>,
    pub list_label: Option<CompiledSelector>,
}

impl CompiledRule {
    /// Compiles `rule` for `host`. Empty container selectors are dropped.
    pub fn compile(host: &str, rule: &SiteRule) -> Result<Self, ConfigError> {
        let mut containers = Vec::with_capacity(rule.content_selectors.len());
        for css in &rule.content_selectors {
            if let Some(sel) = CompiledSelector::parse(host, css)? {
                containers.push(sel);
            }
        }

        Ok(Self {
            containers,
            paragraph: CompiledSelector::parse(host, &rule.paragraph_selector)?,
            text_div: CompiledSelector::parse(host, &rule.text_div_selector)?,
            table: CompiledSelector::parse(host, &rule.table_selector)?,
            list_item: CompiledSelector::parse(host, &rule.list_item_selector)?,
            list_label: CompiledSelector::parse(host, &rule.list_label_selector)?,
        })
    }
}
