use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Document, Value};

/// Predicate deciding whether a document takes part in a search.
///
/// Must be a pure check: the store calls it once per resident document,
/// before any similarity is computed.
pub trait DocumentFilter: Send + Sync {
    fn matches(&self, document: &Document) -> bool;
}

impl<F> DocumentFilter for F
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn matches(&self, document: &Document) -> bool {
        self(document)
    }
}

/// Declarative filter over document metadata.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MetadataFilter {
    Eq(String, Value),
    In(String, Vec<Value>),
    Range {
        key: String,
        min: Option<Value>,
        max: Option<Value>,
    },
    All(Vec<MetadataFilter>),
    Any(Vec<MetadataFilter>),
}

impl DocumentFilter for MetadataFilter {
    fn matches(&self, document: &Document) -> bool {
        metadata_matches(self, &document.metadata)
    }
}

fn metadata_matches(filter: &MetadataFilter, metadata: &HashMap<String, Value>) -> bool {
    match filter {
        MetadataFilter::Eq(key, value) => metadata.get(key).map_or(false, |entry| entry == value),
        MetadataFilter::In(key, values) => metadata
            .get(key)
            .map_or(false, |entry| values.iter().any(|value| value == entry)),
        MetadataFilter::Range { key, min, max } => {
            let Some(value) = metadata.get(key).and_then(Value::as_f64) else {
                return false;
            };
            if let Some(min_value) = min {
                let Some(min_value) = min_value.as_f64() else {
                    return false;
                };
                if value < min_value {
                    return false;
                }
            }
            if let Some(max_value) = max {
                let Some(max_value) = max_value.as_f64() else {
                    return false;
                };
                if value > max_value {
                    return false;
                }
            }
            true
        }
        MetadataFilter::All(filters) => filters
            .iter()
            .all(|filter| metadata_matches(filter, metadata)),
        MetadataFilter::Any(filters) => filters
            .iter()
            .any(|filter| metadata_matches(filter, metadata)),
    }
}
