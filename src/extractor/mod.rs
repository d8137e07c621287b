pub mod element_extractor;
pub mod report;

pub use element_extractor::{ElementExtractor, ExtractionRequest, LayerSelection, WILDCARD_TOKEN};
pub use report::{ConfigSnapshot, ExtractionReport, SequenceOutcome};
