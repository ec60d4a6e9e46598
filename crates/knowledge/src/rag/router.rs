//! Retrieval routing.
//!
//! Picks one partition store and at most one metadata filter. An explicit
//! filename wins over a topic; with neither, the non-PDF partition is
//! searched unfiltered.

use crate::store::{IndexStore, PartitionedStores};
use crate::topic::{extension_of, Topic};
use crate::types::{MetadataFilter, Partition};
use std::sync::Arc;

/// Partition searched when no filename or topic is known.
pub const DEFAULT_PARTITION: Partition = Partition::NonPdf;

/// Partition for a filename, decided by its format.
pub fn partition_for_filename(filename: &str) -> Partition {
    match extension_of(filename).as_deref() {
        Some(".pdf") => Partition::Pdf,
        _ => Partition::NonPdf,
    }
}

/// Partition holding a topic's documents.
///
/// Kept separate from the filename table: topics come from classification,
/// and the two only agree while each topic maps to a single format.
pub fn partition_for_topic(topic: Topic) -> Partition {
    match topic {
        Topic::Technology => Partition::Pdf,
        Topic::People | Topic::Science | Topic::Literature | Topic::Other => Partition::NonPdf,
    }
}

/// Routing decision without the store handle.
pub fn route(filename: Option<&str>, topic: Option<Topic>) -> (Partition, Option<MetadataFilter>) {
    if let Some(filename) = filename {
        return (
            partition_for_filename(filename),
            Some(MetadataFilter::Source(filename.to_string())),
        );
    }

    if let Some(topic) = topic {
        return (partition_for_topic(topic), Some(MetadataFilter::Topic(topic)));
    }

    (DEFAULT_PARTITION, None)
}

/// Store and filter to search for a question.
pub fn select_store(
    filename: Option<&str>,
    topic: Option<Topic>,
    stores: &PartitionedStores,
) -> (Arc<dyn IndexStore>, Option<MetadataFilter>) {
    let (partition, filter) = route(filename, topic);
    (Arc::clone(stores.get(partition)), filter)
}
