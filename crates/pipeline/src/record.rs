// ABOUTME: The Record envelope flowing through the pipeline.
// ABOUTME: Carries the article link, the extracted fullText and any other fields untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A content reference travelling from the source, through extraction, to the sink.
///
/// Only `link` and `fullText` are interpreted; every other field is kept as
/// received and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    link: String,
    #[serde(rename = "fullText", default)]
    pub full_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// A record with no text and no extra fields.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            full_text: String::new(),
            extra: Map::new(),
        }
    }

    /// The article URL. Never modified by the pipeline.
    pub fn link(&self) -> &str {
        &self.link
    }
}
