// ABOUTME: Library entry point for the full-text extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, SelectorConfig, SiteRule and the error types.

//! Full-text extraction for news article pages.
//!
//! Given a URL, the [`Extractor`] looks up the site's selector rule, fetches
//! the page, normalizes its encoding to UTF-8 and pulls out the article body
//! as `<p>`/`<li>` fragments and verbatim tables.
//!
//! # Example
//!
//! ```no_run
//! use fulltext_extractor::{Extractor, SelectorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SelectorConfig::from_path("config/cfg.json")?;
//!     let extractor = Extractor::builder().config(config).build()?;
//!     let text = extractor.extract("https://www.example.com/news/1").await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extractor;
pub mod extractors;
pub mod options;
pub mod resource;

pub use crate::error::{ConfigError, ErrorCode, ExtractError};
pub use crate::extractor::{extract_html, normalize_url, Extractor};
pub use crate::extractors::compiled::{CompiledRule, CompiledSelector};
pub use crate::extractors::rules::{SelectorConfig, SiteRule, DEFAULT_LIST_LABEL_SELECTOR};
pub use crate::options::{ExtractorBuilder, Options, DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
pub use crate::resource::encoding::{normalize as normalize_encoding, EncodingWarning, Normalized};
pub use crate::resource::FetchedDocument;
