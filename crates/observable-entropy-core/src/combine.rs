//! Combiner: merge source records into one aggregate document.

use crate::types::{AggregateDocument, SourceRecord};

/// Build an aggregate document from source records.
///
/// Duplicate names overwrite (last write wins). Zero records yields an
/// empty `data` map, which is still signable.
pub fn combine<I>(records: I) -> AggregateDocument
where
    I: IntoIterator<Item = SourceRecord>,
{
    let mut doc = AggregateDocument::new();
    for record in records {
        doc.insert(record.name.as_str(), record.payload);
    }
    doc
}
