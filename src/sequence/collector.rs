use crate::sequence::entry::SequenceEntry;
use crate::sequence::metadata::ElementSource;
use std::path::Path;
use walkdir::WalkDir;

/// File extension of the renderer's multi-layer container format.
pub const CXR_EXTENSION: &str = "cxr";

/// Result of walking an input path: the entries that parsed, plus a
/// diagnostic line for everything that was skipped.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub entries: Vec<SequenceEntry>,
    pub skipped: Vec<String>,
}

impl CollectionOutcome {
    fn skip<S: Into<String>>(&mut self, reason: S) {
        self.skipped.push(reason.into());
    }
}

/// Walks a file-or-directory input and builds a `SequenceEntry` for every
/// CXR file found. Individual failures are recorded and skipped; the
/// collection itself never aborts.
pub struct SequenceCollector<'a> {
    elements: &'a dyn ElementSource,
}

impl<'a> SequenceCollector<'a> {
    pub fn new(elements: &'a dyn ElementSource) -> Self {
        Self { elements }
    }

    pub fn collect(&self, input: &Path) -> CollectionOutcome {
        let mut outcome = CollectionOutcome::default();

        if !input.exists() {
            outcome.skip(format!("Path does not exist: {}", input.display()));
            return outcome;
        }

        if input.is_file() {
            self.collect_file(input, &mut outcome);
        } else {
            self.collect_directory(input, &mut outcome);
        }

        // Directory-walk order is platform-dependent; sort for
        // reproducible output.
        outcome
            .entries
            .sort_by(|a, b| a.full_path().cmp(&b.full_path()));

        outcome
    }

    fn collect_file(&self, path: &Path, outcome: &mut CollectionOutcome) {
        if !has_cxr_extension(path) {
            outcome.skip(format!(
                "Input file is not a .{} file: {}",
                CXR_EXTENSION,
                path.display()
            ));
            return;
        }

        match SequenceEntry::from_path(path, self.elements) {
            Ok(entry) => outcome.entries.push(entry),
            Err(err) => outcome.skip(format!("Error parsing {}: {}", path.display(), err)),
        }
    }

    fn collect_directory(&self, root: &Path, outcome: &mut CollectionOutcome) {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    outcome.skip(format!("Scan error: {}", err));
                    continue;
                }
            };

            if !entry.file_type().is_file() || !has_cxr_extension(entry.path()) {
                continue;
            }

            match SequenceEntry::from_path(entry.path(), self.elements) {
                Ok(seq_entry) => outcome.entries.push(seq_entry),
                Err(err) => {
                    outcome.skip(format!("Error parsing {}: {}", entry.path().display(), err))
                }
            }
        }
    }
}

fn has_cxr_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CXR_EXTENSION))
}
