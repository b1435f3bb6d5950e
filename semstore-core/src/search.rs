use std::fmt;

use crate::{Document, DocumentFilter, StoreError};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_THRESHOLD: f32 = 0.0;

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

/// Per-query knobs for the ranking pipeline.
///
/// `threshold` is inclusive. With the default of `0.0`, documents pointing
/// away from the query (negative score) are dropped.
#[derive(Clone, Copy)]
pub struct SearchOptions<'a> {
    pub top_k: usize,
    pub threshold: f32,
    pub filter: Option<&'a dyn DocumentFilter>,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
            filter: None,
        }
    }
}

impl fmt::Debug for SearchOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("top_k", &self.top_k)
            .field("threshold", &self.threshold)
            .field("filter", &self.filter.map(|_| "<filter>"))
            .finish()
    }
}

impl<'a> SearchOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top_k(mut self, value: usize) -> Self {
        self.top_k = value;
        self
    }

    pub fn threshold(mut self, value: f32) -> Self {
        self.threshold = value;
        self
    }

    pub fn filter(mut self, value: &'a dyn DocumentFilter) -> Self {
        self.filter = Some(value);
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.top_k == 0 {
            return Err(StoreError::InvalidOptions(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if self.threshold.is_nan() {
            return Err(StoreError::InvalidOptions(
                "threshold must not be NaN".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies the filter to `document`; `true` when no filter is set.
    pub fn admits(&self, document: &Document) -> bool {
        self.filter.map_or(true, |filter| filter.matches(document))
    }
}
