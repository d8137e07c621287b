use crate::error::{CxrExtractError, Result};
use crate::sequence::elements::parse_element_list;
use crate::sequence::metadata::ElementSource;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Frames must be named `<sequence>.<4-digit frame>.<ext>`.
fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+)\.(\d{4})\.\w+$").expect("valid frame pattern"))
}

/// One rendered CXR frame: its identity within a sequence plus the render
/// elements it offers for extraction.
///
/// Built once at collection time and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SequenceEntry {
    pub file_name: String,
    pub directory_path: PathBuf,
    pub frame_number: u32,
    pub sequence_name: String,
    pub available_layers: Vec<String>,
}

impl SequenceEntry {
    /// Build an entry from a file path, reading the embedded element list
    /// through `elements`.
    ///
    /// Fails with `CxrExtractError::Naming` when the base name does not
    /// match the frame pattern. Metadata read failures are absorbed: the
    /// entry then carries only the fixed `[BEAUTY, Alpha]` elements.
    pub fn from_path(path: &Path, elements: &dyn ElementSource) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CxrExtractError::Naming {
                name: path.display().to_string(),
            })?
            .to_string();

        let captures =
            frame_pattern()
                .captures(&file_name)
                .ok_or_else(|| CxrExtractError::Naming {
                    name: file_name.clone(),
                })?;

        let sequence_name = captures[1].to_string();
        let frame_number =
            captures[2]
                .parse::<u32>()
                .map_err(|_| CxrExtractError::Naming {
                    name: file_name.clone(),
                })?;

        let directory_path = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

        let raw = elements
            .raw_elements(&directory_path.join(&file_name))
            .ok()
            .flatten();
        let available_layers = parse_element_list(raw.as_deref().unwrap_or(""));

        Ok(Self {
            file_name,
            directory_path,
            frame_number,
            sequence_name,
            available_layers,
        })
    }

    pub fn full_path(&self) -> PathBuf {
        self.directory_path.join(&self.file_name)
    }

    /// `<sequence>.<frame>` with the frame zero-padded to 4 digits.
    pub fn display_id(&self) -> String {
        format!("{}.{:04}", self.sequence_name, self.frame_number)
    }
}

impl fmt::Display for SequenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_id())
    }
}
