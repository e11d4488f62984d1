// ABOUTME: Configuration options for the Extractor and the fluent ExtractorBuilder.
// ABOUTME: Holds the selector config, outbound request headers, an optional fetch timeout and logging dispatch.

use std::sync::Arc;
use std::time::Duration;

use tracing::Dispatch;

use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::extractors::rules::SelectorConfig;

/// User agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsAggregator/1.0)";

/// Accept header sent with every page request.
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Configuration options for the [`Extractor`].
#[derive(Debug, Clone)]
pub struct Options {
    pub user_agent: String,
    pub accept: String,
    /// Total time allowed for one page fetch. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
    pub http_client: Option<reqwest::Client>,
    pub config: Arc<SelectorConfig>,
    /// Where extraction logs go. `None` uses the dispatcher current at call time.
    pub dispatch: Option<Dispatch>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            fetch_timeout: None,
            http_client: None,
            config: Arc::new(SelectorConfig::default()),
            dispatch: None,
        }
    }
}

/// Builder for constructing [`Extractor`] instances.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options and no configured sites.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector rules.
    pub fn config(mut self, config: SelectorConfig) -> Self {
        self.opts.config = Arc::new(config);
        self
    }

    /// Share an already-built selector config.
    pub fn shared_config(mut self, config: Arc<SelectorConfig>) -> Self {
        self.opts.config = config;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the Accept header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.opts.accept = accept.into();
        self
    }

    /// Bound each page fetch. Without this a stalled server stalls the caller.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.opts.fetch_timeout = Some(timeout);
        self
    }

    /// Use a custom HTTP client. User agent and timeout options are then up to that client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Route this extractor's logs to `dispatch`.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.opts.dispatch = Some(dispatch);
        self
    }

    /// Build the Extractor, creating the HTTP client if none was given.
    pub fn build(self) -> Result<Extractor, ExtractError> {
        Extractor::new(self.opts)
    }
}
