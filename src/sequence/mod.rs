pub mod collector;
pub mod elements;
pub mod entry;
pub mod grouping;
pub mod metadata;

pub use collector::{CollectionOutcome, SequenceCollector, CXR_EXTENSION};
pub use elements::{parse_element_list, ALPHA_ELEMENT, BEAUTY_ELEMENT};
pub use entry::SequenceEntry;
pub use grouping::{group_by_sequence, SequenceMap};
pub use metadata::{ElementSource, MetadataError, NullElementSource};
