use crate::config::SelectionConfig;
use crate::error::Result;
use crate::extractor::{ExtractionRequest, LayerSelection};
use crate::sequence::SequenceMap;

/// Decides which sequences to process and which elements to extract from
/// each. Implementations may be interactive, config-driven, or scripted;
/// the pipeline only sees the resulting request.
///
/// A sequence left out of the request is skipped. An element list in the
/// request is always non-empty.
pub trait SelectionSource {
    fn select(&self, sequences: &SequenceMap) -> Result<ExtractionRequest>;
}

/// Non-interactive selection driven by CLI/config values.
///
/// Empty `sequences` selects every sequence. Empty `elements` (or
/// `all_elements`) selects the wildcard. Explicit element names are
/// intersected with each sequence's available elements, keeping request
/// order; a sequence with no surviving element is skipped.
#[derive(Debug, Default, Clone)]
pub struct CliSelection {
    sequences: Vec<String>,
    elements: Vec<String>,
    all_elements: bool,
}

impl CliSelection {
    pub fn new(sequences: Vec<String>, elements: Vec<String>, all_elements: bool) -> Self {
        Self {
            sequences,
            elements,
            all_elements,
        }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(
            config.sequences.clone(),
            config.elements.clone(),
            config.all_elements,
        )
    }
}

impl SelectionSource for CliSelection {
    fn select(&self, sequences: &SequenceMap) -> Result<ExtractionRequest> {
        let mut request = ExtractionRequest::new();

        for (name, frames) in sequences {
            if !self.sequences.is_empty() && !self.sequences.contains(name) {
                continue;
            }

            let selection = if self.all_elements || self.elements.is_empty() {
                LayerSelection::AllLayers
            } else {
                // Frames of one sequence share the same element list; use
                // the first frame's, as the original selection UI did.
                let available = &frames[0].available_layers;
                let chosen: Vec<String> = self
                    .elements
                    .iter()
                    .filter(|e| available.contains(e))
                    .cloned()
                    .collect();

                if chosen.is_empty() {
                    continue;
                }
                LayerSelection::Elements(chosen)
            };

            request.insert(name.clone(), selection);
        }

        Ok(request)
    }
}
