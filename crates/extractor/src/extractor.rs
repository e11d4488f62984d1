// ABOUTME: The Extractor that resolves a URL to its site rule, fetches the page and extracts the article text.
// ABOUTME: Provides async extract() for URLs and extract_html() for already-decoded documents.

use std::borrow::Cow;

use scraper::Html;
use tracing::instrument::WithSubscriber;

use crate::error::ExtractError;
use crate::extractors::compiled::CompiledRule;
use crate::extractors::content::extract_document;
use crate::extractors::rules::SelectorConfig;
use crate::options::{ExtractorBuilder, Options};
use crate::resource::fetch;

/// Strips a `www.` host prefix from http and https URLs.
///
/// Sites are configured under their bare host, so both spellings must resolve
/// to the same rule.
pub fn normalize_url(url: &str) -> Cow<'_, str> {
    for scheme in ["https://", "http://"] {
        if let Some(bare) = url
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("www."))
        {
            return Cow::Owned(format!("{scheme}{bare}"));
        }
    }
    Cow::Borrowed(url)
}

/// Parses `html` and applies `rule`, falling back to body children when the rule finds nothing.
pub fn extract_html(html: &str, rule: &CompiledRule) -> String {
    let doc = Html::parse_document(html);
    extract_document(&doc, rule)
}

/// Fetches article pages and extracts their text using per-site selector rules.
///
/// Cheap to share behind an `Arc`: the rules are immutable and the HTTP client
/// is internally reference counted.
#[derive(Debug)]
pub struct Extractor {
    opts: Options,
    http_client: reqwest::Client,
}

impl Extractor {
    /// Create a new ExtractorBuilder.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create a new Extractor with the given options.
    pub fn new(opts: Options) -> Result<Self, ExtractError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder()
                    .user_agent(&opts.user_agent)
                    .gzip(true)
                    .brotli(true)
                    .deflate(true);
                if let Some(timeout) = opts.fetch_timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    ExtractError::fetch(
                        "",
                        "Build",
                        Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                    )
                })?
            }
        };

        Ok(Self { opts, http_client })
    }

    /// The selector rules this extractor resolves hosts against.
    pub fn config(&self) -> &SelectorConfig {
        &self.opts.config
    }

    /// Fetches `url` and returns the extracted article text.
    ///
    /// An empty string means the page had no extractable content; it is not an
    /// error. Hosts without a rule fail before any request is made.
    pub async fn extract(&self, url: &str) -> Result<String, ExtractError> {
        match &self.opts.dispatch {
            Some(dispatch) => self.extract_inner(url).with_subscriber(dispatch.clone()).await,
            None => self.extract_inner(url).await,
        }
    }

    async fn extract_inner(&self, url: &str) -> Result<String, ExtractError> {
        let normalized = normalize_url(url);

        let parsed = url::Url::parse(&normalized).map_err(|e| {
            ExtractError::invalid_url(url, "Extract", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        let host = parsed.host_str().ok_or_else(|| {
            ExtractError::invalid_url(url, "Extract", Some(anyhow::anyhow!("URL has no host")))
        })?;

        let rule = self
            .opts
            .config
            .lookup(host)
            .ok_or_else(|| ExtractError::unconfigured_domain(url, "Extract", host))?;

        let document = fetch(&self.http_client, &normalized, &self.opts.accept).await?;
        let html = document.text_utf8();
        let content = extract_html(&html, rule);

        if content.is_empty() {
            tracing::info!(url = %url, "no extractable content");
        } else {
            tracing::debug!(url = %url, bytes = content.len(), "content extracted");
        }
        Ok(content)
    }
}
