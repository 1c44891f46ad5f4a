//! Literal-delimiter chunking of ingested text

use crate::error::{PipelineError, PipelineResult};
use chrono::{Local, NaiveDate};

/// Delimiter used when none is configured
pub const DEFAULT_DELIMITER: &str = "###";

/// One segment of an ingested file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position among all segments of the source, empty ones included
    pub index: usize,
    /// Trimmed segment text
    pub raw_text: String,
    /// Day the chunk was produced
    pub creation_date: NaiveDate,
}

/// Splits text on a literal delimiter
#[derive(Debug, Clone)]
pub struct Chunker {
    delimiter: String,
}

impl Chunker {
    /// Create a chunker. The delimiter is matched literally and must not be empty.
    pub fn new(delimiter: impl Into<String>) -> PipelineResult<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(PipelineError::configuration(
                "split delimiter must not be empty",
            ));
        }
        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Split `text` into chunks dated today.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        self.split_dated(text, Local::now().date_naive())
    }

    /// Split `text` into chunks carrying `date`.
    ///
    /// Segments that are empty after trimming are dropped, but still count
    /// towards the index of later segments.
    pub fn split_dated(&self, text: &str, date: NaiveDate) -> Vec<Chunk> {
        text.split(self.delimiter.as_str())
            .enumerate()
            .filter_map(|(i, segment)| {
                let trimmed = segment.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Chunk {
                        index: i + 1,
                        raw_text: trimmed.to_string(),
                        creation_date: date,
                    })
                }
            })
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}
