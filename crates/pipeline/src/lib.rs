// ABOUTME: Library entry point for the full-text enrichment pipeline.
// ABOUTME: Re-exports Pipeline, Record, the bus seams and the JSON-lines transport.

//! Full-text enrichment pipeline.
//!
//! Records are read from a [`RecordSource`], enriched with the article text of
//! their `link` by a [`fulltext_extractor::Extractor`], and written to a
//! [`RecordSink`]. The three stages run concurrently and hand records over
//! through unbuffered [`handoff`] channels.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fulltext_extractor::{Extractor, SelectorConfig};
//! use fulltext_pipeline::{JsonLinesSink, JsonLinesSource, Pipeline};
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SelectorConfig::from_path("config/cfg.json")?;
//!     let extractor = Arc::new(Extractor::builder().config(config).build()?);
//!     let stats = Pipeline::builder(extractor)
//!         .build()
//!         .run(
//!             JsonLinesSource::new(BufReader::new(tokio::io::stdin())),
//!             JsonLinesSink::new(tokio::io::stdout()),
//!         )
//!         .await?;
//!     eprintln!("{:?}", stats);
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod error;
pub mod handoff;
pub mod lines;
pub mod orchestrator;
pub mod record;

pub use crate::bus::{RecordSink, RecordSource};
pub use crate::error::{BusError, PipelineError};
pub use crate::lines::{JsonLinesSink, JsonLinesSource};
pub use crate::orchestrator::{Pipeline, PipelineBuilder, PipelineStats};
pub use crate::record::Record;
