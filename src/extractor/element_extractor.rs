use crate::config::{Config, ImageFormat};
use crate::sequence::SequenceEntry;
use crate::ui::output::OutputFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Element token the external tool interprets as "every element at once".
pub const WILDCARD_TOKEN: &str = "*";

/// Label used in output filenames produced by a wildcard extraction.
const COMBINED_OUTPUT_LABEL: &str = "ALL";

/// Which render elements to extract for one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelection {
    /// One wildcard pass writing every element to a combined output.
    AllLayers,
    /// One pass per named element, in the order given. Never empty.
    Elements(Vec<String>),
}

impl LayerSelection {
    pub fn describe(&self) -> String {
        match self {
            LayerSelection::AllLayers => "all elements".to_string(),
            LayerSelection::Elements(elements) => elements.join(", "),
        }
    }
}

/// Sequence name mapped to the elements chosen for it. A sequence absent
/// from the request is skipped entirely.
pub type ExtractionRequest = BTreeMap<String, LayerSelection>;

#[derive(Error, Debug)]
enum InvocationError {
    #[error("conversion tool not found at: {path}")]
    ToolNotFound { path: String },

    #[error("conversion tool exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("failed to run conversion tool: {0}")]
    Io(#[from] io::Error),
}

/// Drives the external conversion tool to materialize render elements as
/// one image file per frame.
///
/// Each call to [`extract_sequence`](Self::extract_sequence) is
/// independent and confined to its own output subdirectory. Frames whose
/// output already exists with non-zero size are skipped unless the
/// overwrite flag is set, so re-runs only do the remaining work.
pub struct ElementExtractor {
    tool_path: PathBuf,
    output_format: ImageFormat,
    overwrite: bool,
}

impl ElementExtractor {
    pub fn new(tool_path: PathBuf, output_format: ImageFormat, overwrite: bool) -> Self {
        Self {
            tool_path,
            output_format,
            overwrite,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tool.path.clone(),
            config.output.format,
            config.output.overwrite,
        )
    }

    /// Extract the selected elements from every frame of one sequence.
    ///
    /// The sequence folder is `<output_dir>/<prefix>_<sequence>` (or just
    /// the sequence name without a prefix). Returns false on the first
    /// failed invocation; remaining elements are not attempted. Problems
    /// are logged through `reporter`, never raised.
    pub fn extract_sequence(
        &self,
        frames: &[SequenceEntry],
        selection: &LayerSelection,
        output_dir: &Path,
        prefix: Option<&str>,
        reporter: &OutputFormatter,
    ) -> bool {
        let Some(first) = frames.first() else {
            return false;
        };
        let seq_name = first.sequence_name.clone();

        let folder_name = match prefix {
            Some(p) if !p.is_empty() => format!("{}_{}", p, seq_name),
            _ => seq_name.clone(),
        };
        let sequence_dir = output_dir.join(folder_name);

        if let Err(err) = fs::create_dir_all(&sequence_dir) {
            reporter.error(&format!(
                "Failed to create output directory {}: {}",
                sequence_dir.display(),
                err
            ));
            return false;
        }

        match selection {
            LayerSelection::AllLayers => {
                self.extract_combined(frames, &sequence_dir, &seq_name, reporter)
            }
            LayerSelection::Elements(elements) => {
                self.extract_elements(frames, elements, &sequence_dir, &seq_name, reporter)
            }
        }
    }

    /// Wildcard path: one invocation covering every pending frame.
    fn extract_combined(
        &self,
        frames: &[SequenceEntry],
        sequence_dir: &Path,
        seq_name: &str,
        reporter: &OutputFormatter,
    ) -> bool {
        let pairs = self.pending_frames(frames, sequence_dir, seq_name, COMBINED_OUTPUT_LABEL, reporter);

        if pairs.is_empty() {
            reporter.info(&format!(
                "All files already exist for {} (all elements), skipping",
                seq_name
            ));
            return true;
        }

        match self.invoke(WILDCARD_TOKEN, &pairs, reporter) {
            Ok(()) => true,
            Err(err) => {
                reporter.error(&format!("Failed to extract all elements: {}", err));
                false
            }
        }
    }

    /// Explicit-element path: one invocation per element, fail-fast.
    fn extract_elements(
        &self,
        frames: &[SequenceEntry],
        elements: &[String],
        sequence_dir: &Path,
        seq_name: &str,
        reporter: &OutputFormatter,
    ) -> bool {
        for element in elements {
            let pairs = self.pending_frames(frames, sequence_dir, seq_name, element, reporter);

            if pairs.is_empty() {
                reporter.info(&format!(
                    "All files already exist for {} - {}, skipping",
                    seq_name, element
                ));
                continue;
            }

            if let Err(err) = self.invoke(element, &pairs, reporter) {
                reporter.error(&format!("Failed to extract {}: {}", element, err));
                return false;
            }
        }

        true
    }

    /// Input/output path pairs for the frames still needing extraction.
    fn pending_frames(
        &self,
        frames: &[SequenceEntry],
        sequence_dir: &Path,
        seq_name: &str,
        label: &str,
        reporter: &OutputFormatter,
    ) -> Vec<(PathBuf, PathBuf)> {
        let mut pairs = Vec::new();

        for frame in frames {
            let output_path = sequence_dir.join(format!(
                "{}_{}.{:04}.{}",
                seq_name,
                label,
                frame.frame_number,
                self.output_format.extension()
            ));

            if !self.overwrite && is_extracted(&output_path) {
                reporter.debug(&format!(
                    "Skipping existing file: {}",
                    output_path.display()
                ));
                continue;
            }

            pairs.push((frame.full_path(), output_path));
        }

        pairs
    }

    /// Run the tool once for `element`, blocking until it exits. Output
    /// streams are captured for diagnostics only.
    fn invoke(
        &self,
        element: &str,
        pairs: &[(PathBuf, PathBuf)],
        reporter: &OutputFormatter,
    ) -> Result<(), InvocationError> {
        let mut command = Command::new(&self.tool_path);
        command.arg("--batch").arg("-e").arg(element);
        for (input, output) in pairs {
            command.arg(input).arg(output);
        }

        let output = command.output().map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => InvocationError::ToolNotFound {
                path: self.tool_path.display().to_string(),
            },
            _ => InvocationError::Io(err),
        })?;

        if !output.status.success() {
            return Err(InvocationError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            reporter.debug(stdout.trim());
        }

        Ok(())
    }
}

/// A frame counts as extracted only when its output exists with non-zero
/// size; zero-byte leftovers are re-attempted.
fn is_extracted(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::NullElementSource;
    use crate::ui::output::OutputMode;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_reporter() -> OutputFormatter {
        OutputFormatter::new(OutputMode::Plain, 0, true)
    }

    fn make_frame(dir: &Path, name: &str) -> SequenceEntry {
        let path = dir.join(name);
        fs::write(&path, b"frame data").unwrap();
        SequenceEntry::from_path(&path, &NullElementSource).unwrap()
    }

    fn bogus_extractor(overwrite: bool) -> ElementExtractor {
        ElementExtractor::new(
            PathBuf::from("/nonexistent/CoronaImageCmd"),
            ImageFormat::Exr,
            overwrite,
        )
    }

    #[test]
    fn test_empty_frames_fail_without_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = bogus_extractor(false);

        let ok = extractor.extract_sequence(
            &[],
            &LayerSelection::AllLayers,
            temp_dir.path(),
            None,
            &quiet_reporter(),
        );

        assert!(!ok);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_skip_existing_avoids_invocation() {
        let temp_dir = TempDir::new().unwrap();
        let frame = make_frame(temp_dir.path(), "shot.0001.cxr");

        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_Reflect.0001.exr"), b"image").unwrap();

        // The tool path is bogus, so returning true proves no invocation
        // was attempted.
        let extractor = bogus_extractor(false);
        let ok = extractor.extract_sequence(
            &[frame],
            &LayerSelection::Elements(vec!["Reflect".to_string()]),
            temp_dir.path(),
            None,
            &quiet_reporter(),
        );

        assert!(ok);
    }

    #[test]
    fn test_zero_byte_output_is_reattempted() {
        let temp_dir = TempDir::new().unwrap();
        let frame = make_frame(temp_dir.path(), "shot.0001.cxr");

        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_Reflect.0001.exr"), b"").unwrap();

        let extractor = bogus_extractor(false);
        let ok = extractor.extract_sequence(
            &[frame],
            &LayerSelection::Elements(vec!["Reflect".to_string()]),
            temp_dir.path(),
            None,
            &quiet_reporter(),
        );

        assert!(!ok);
    }

    #[test]
    fn test_overwrite_forces_invocation() {
        let temp_dir = TempDir::new().unwrap();
        let frame = make_frame(temp_dir.path(), "shot.0001.cxr");

        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_ALL.0001.exr"), b"image").unwrap();

        let extractor = bogus_extractor(true);
        let ok = extractor.extract_sequence(
            &[frame],
            &LayerSelection::AllLayers,
            temp_dir.path(),
            None,
            &quiet_reporter(),
        );

        assert!(!ok);
    }

    #[test]
    fn test_wildcard_fully_skipped_is_success() {
        let temp_dir = TempDir::new().unwrap();
        let frames = vec![
            make_frame(temp_dir.path(), "shot.0001.cxr"),
            make_frame(temp_dir.path(), "shot.0002.cxr"),
        ];

        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_ALL.0001.exr"), b"image").unwrap();
        fs::write(sequence_dir.join("shot_ALL.0002.exr"), b"image").unwrap();

        let extractor = bogus_extractor(false);
        let ok = extractor.extract_sequence(
            &frames,
            &LayerSelection::AllLayers,
            temp_dir.path(),
            None,
            &quiet_reporter(),
        );

        assert!(ok);
    }

    #[test]
    fn test_prefix_names_sequence_folder() {
        let temp_dir = TempDir::new().unwrap();
        let frame = make_frame(temp_dir.path(), "shot.0001.cxr");

        let sequence_dir = temp_dir.path().join("extracted_shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_Alpha.0001.exr"), b"image").unwrap();

        let extractor = bogus_extractor(false);
        let ok = extractor.extract_sequence(
            &[frame],
            &LayerSelection::Elements(vec!["Alpha".to_string()]),
            temp_dir.path(),
            Some("extracted"),
            &quiet_reporter(),
        );

        assert!(ok);
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let frame = make_frame(temp_dir.path(), "shot.0001.cxr");

        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_Alpha.0001.exr"), b"image").unwrap();

        let extractor = bogus_extractor(false);
        let ok = extractor.extract_sequence(
            &[frame],
            &LayerSelection::Elements(vec!["Alpha".to_string()]),
            temp_dir.path(),
            Some(""),
            &quiet_reporter(),
        );

        assert!(ok);
    }

    #[test]
    fn test_selection_description() {
        assert_eq!(LayerSelection::AllLayers.describe(), "all elements");
        assert_eq!(
            LayerSelection::Elements(vec!["Reflect".to_string(), "Refract".to_string()])
                .describe(),
            "Reflect, Refract"
        );
    }

    #[cfg(unix)]
    mod fake_tool {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Shell stand-in for the conversion tool: records every argument
        /// to a log file, one per line, and exits with the given status.
        fn install_fake_tool(dir: &Path, exit_code: i32) -> (PathBuf, PathBuf) {
            let log_path = dir.join("invocations.log");
            let tool_path = dir.join("fake-tool.sh");
            let script = format!(
                "#!/bin/sh\nprintf 'INVOKED\\n' >> '{log}'\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{log}'; done\nexit {code}\n",
                log = log_path.display(),
                code = exit_code
            );
            fs::write(&tool_path, script).unwrap();
            fs::set_permissions(&tool_path, fs::Permissions::from_mode(0o755)).unwrap();
            (tool_path, log_path)
        }

        fn logged_args(log_path: &Path) -> Vec<String> {
            fs::read_to_string(log_path)
                .unwrap_or_default()
                .lines()
                .map(|l| l.to_string())
                .collect()
        }

        #[test]
        fn test_single_invocation_covers_all_frames() {
            let temp_dir = TempDir::new().unwrap();
            let (tool_path, log_path) = install_fake_tool(temp_dir.path(), 0);

            let input_dir = temp_dir.path().join("renders");
            fs::create_dir(&input_dir).unwrap();
            let frames = vec![
                make_frame(&input_dir, "shot.0001.cxr"),
                make_frame(&input_dir, "shot.0002.cxr"),
            ];

            let extractor = ElementExtractor::new(tool_path, ImageFormat::Exr, false);
            let ok = extractor.extract_sequence(
                &frames,
                &LayerSelection::Elements(vec!["Reflect".to_string()]),
                &input_dir,
                None,
                &quiet_reporter(),
            );
            assert!(ok);

            let args = logged_args(&log_path);
            assert_eq!(args.iter().filter(|a| *a == "INVOKED").count(), 1);
            assert_eq!(args[1], "--batch");
            assert_eq!(args[2], "-e");
            assert_eq!(args[3], "Reflect");

            let sequence_dir = input_dir.join("shot");
            assert_eq!(
                args[5],
                sequence_dir.join("shot_Reflect.0001.exr").display().to_string()
            );
            assert_eq!(
                args[7],
                sequence_dir.join("shot_Reflect.0002.exr").display().to_string()
            );
        }

        #[test]
        fn test_wildcard_uses_combined_label() {
            let temp_dir = TempDir::new().unwrap();
            let (tool_path, log_path) = install_fake_tool(temp_dir.path(), 0);

            let input_dir = temp_dir.path().join("renders");
            fs::create_dir(&input_dir).unwrap();
            let frames = vec![make_frame(&input_dir, "shot.0003.cxr")];

            let extractor = ElementExtractor::new(tool_path, ImageFormat::Jpg, false);
            let ok = extractor.extract_sequence(
                &frames,
                &LayerSelection::AllLayers,
                &input_dir,
                None,
                &quiet_reporter(),
            );
            assert!(ok);

            let args = logged_args(&log_path);
            assert_eq!(args[3], "*");
            assert!(args[5].ends_with("shot_ALL.0003.jpg"));
        }

        #[test]
        fn test_existing_outputs_are_excluded_from_invocation() {
            let temp_dir = TempDir::new().unwrap();
            let (tool_path, log_path) = install_fake_tool(temp_dir.path(), 0);

            let input_dir = temp_dir.path().join("renders");
            fs::create_dir(&input_dir).unwrap();
            let frames = vec![
                make_frame(&input_dir, "shot.0001.cxr"),
                make_frame(&input_dir, "shot.0002.cxr"),
            ];

            let sequence_dir = input_dir.join("shot");
            fs::create_dir(&sequence_dir).unwrap();
            fs::write(sequence_dir.join("shot_ALL.0001.exr"), b"image").unwrap();

            let extractor = ElementExtractor::new(tool_path, ImageFormat::Exr, false);
            let ok = extractor.extract_sequence(
                &frames,
                &LayerSelection::AllLayers,
                &input_dir,
                None,
                &quiet_reporter(),
            );
            assert!(ok);

            let args = logged_args(&log_path);
            // One invocation, one frame pair: --batch, -e, *, input, output.
            assert_eq!(args.len(), 6);
            assert!(args[4].ends_with("shot.0002.cxr"));
        }

        #[test]
        fn test_failed_element_aborts_remaining_layers() {
            let temp_dir = TempDir::new().unwrap();
            let (tool_path, log_path) = install_fake_tool(temp_dir.path(), 1);

            let input_dir = temp_dir.path().join("renders");
            fs::create_dir(&input_dir).unwrap();
            let frames = vec![make_frame(&input_dir, "shot.0001.cxr")];

            let extractor = ElementExtractor::new(tool_path, ImageFormat::Exr, false);
            let ok = extractor.extract_sequence(
                &frames,
                &LayerSelection::Elements(vec![
                    "Reflect".to_string(),
                    "Refract".to_string(),
                ]),
                &input_dir,
                None,
                &quiet_reporter(),
            );
            assert!(!ok);

            let args = logged_args(&log_path);
            assert_eq!(args.iter().filter(|a| *a == "INVOKED").count(), 1);
            assert!(args.iter().any(|a| a == "Reflect"));
            assert!(!args.iter().any(|a| a == "Refract"));
        }
    }
}
