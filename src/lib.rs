pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod sequence;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ImageFormat, OutputConfig, SelectionConfig, ToolConfig};
pub use error::{CxrExtractError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    ConfigSnapshot, ElementExtractor, ExtractionReport, ExtractionRequest, LayerSelection,
    SequenceOutcome,
};
pub use sequence::{
    group_by_sequence, parse_element_list, CollectionOutcome, ElementSource, NullElementSource,
    SequenceCollector, SequenceEntry, SequenceMap,
};
pub use ui::{
    CliSelection, GracefulShutdown, OutputFormatter, OutputMode, ProgressManager, SelectionSource,
};

use std::path::Path;
use std::time::Instant;

/// Main library interface: wires the collector, grouper, selection, and
/// extractor into one run.
pub struct CxrExtract {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl CxrExtract {
    /// Create a new CxrExtract instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a CxrExtract instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create CxrExtract instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Collect CXR files under `input` and group them into frame-ordered
    /// sequences. Per-file failures are logged and skipped; an empty
    /// result is terminal.
    pub fn discover(
        &self,
        input: &Path,
        elements: &dyn ElementSource,
    ) -> Result<SequenceMap> {
        self.output_formatter.start_operation("Collecting CXR files");

        let outcome = SequenceCollector::new(elements).collect(input);
        for skipped in &outcome.skipped {
            self.output_formatter.warning(skipped);
        }

        if outcome.entries.is_empty() {
            return Err(CxrExtractError::NoFilesFound {
                path: input.display().to_string(),
            });
        }

        self.output_formatter
            .info(&format!("Found {} CXR file(s)", outcome.entries.len()));

        Ok(group_by_sequence(outcome.entries))
    }

    /// Run the full extraction pipeline for `input`.
    ///
    /// One sequence is processed at a time; a failed sequence is recorded
    /// and the run continues with the next. The returned report carries
    /// the per-sequence outcomes; `Err` is reserved for whole-run
    /// conditions (nothing found, nothing selected, cancelled).
    pub fn run(
        &self,
        input: &Path,
        selector: &dyn SelectionSource,
        elements: &dyn ElementSource,
    ) -> Result<ExtractionReport> {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        let sequences = self.discover(input, elements)?;
        self.shutdown.check_shutdown()?;

        let request = selector.select(&sequences)?;
        if request.is_empty() {
            return Err(CxrExtractError::NoSelectionMade);
        }

        self.output_formatter.start_operation(&format!(
            "Extracting {} of {} sequence(s)",
            request.len(),
            sequences.len()
        ));

        let extractor = ElementExtractor::from_config(&self.config);
        let mut outcomes = Vec::new();
        let mut errors = Vec::new();

        for (name, frames) in &sequences {
            self.shutdown.check_shutdown()?;

            let Some(selection) = request.get(name) else {
                self.output_formatter
                    .warning(&format!("No elements selected for {}, skipping", name));
                continue;
            };

            let output_dir = self
                .config
                .output
                .base_directory
                .clone()
                .unwrap_or_else(|| frames[0].directory_path.clone());

            let description = format!("{} - {}", name, selection.describe());
            let pb = self
                .progress_manager
                .create_frame_progress(frames.len() as u64, &description);
            let sequence_start = Instant::now();

            let succeeded = extractor.extract_sequence(
                frames,
                selection,
                &output_dir,
                self.config.output.prefix.as_deref(),
                &self.output_formatter,
            );

            if succeeded {
                pb.inc(frames.len() as u64);
                ui::progress::finish_progress_with_summary(
                    &pb,
                    &format!("Extracted {}", name),
                    sequence_start.elapsed(),
                );
            } else {
                pb.abandon_with_message(format!("Failed to extract {}", name));
                errors.push(format!("Failed to extract sequence '{}'", name));
            }

            outcomes.push(SequenceOutcome {
                name: name.clone(),
                frames: frames.len(),
                first_frame: frames.first().map(|f| f.frame_number).unwrap_or(0),
                last_frame: frames.last().map(|f| f.frame_number).unwrap_or(0),
                elements: selection.describe(),
                succeeded,
            });
        }

        let report = ExtractionReport::new(
            input.display().to_string(),
            start_time.elapsed(),
            outcomes,
            errors,
            ConfigSnapshot::from_config(&self.config),
        );

        self.output_formatter.print_extraction_summary(&report);

        Ok(report)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(CxrExtractError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CxrExtractError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn quiet_app(config: Config) -> CxrExtract {
        CxrExtract::new_for_test(config, OutputMode::Plain, 0, true)
    }

    fn bogus_tool_config() -> Config {
        let mut config = Config::default();
        config.tool.path = PathBuf::from("/nonexistent/CoronaImageCmd");
        config
    }

    #[test]
    fn test_cxr_extract_creation() {
        let app = quiet_app(Config::default());
        assert!(app.is_running());
        assert_eq!(app.config().output.format, ImageFormat::Exr);
    }

    #[test]
    fn test_run_with_no_files_found() {
        let temp_dir = TempDir::new().unwrap();
        let app = quiet_app(bogus_tool_config());

        let result = app.run(temp_dir.path(), &CliSelection::default(), &NullElementSource);
        assert!(matches!(result, Err(CxrExtractError::NoFilesFound { .. })));
    }

    #[test]
    fn test_run_with_no_selection() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shot.0001.cxr"), b"frame").unwrap();

        let app = quiet_app(bogus_tool_config());
        let selector = CliSelection::new(vec!["other".to_string()], Vec::new(), false);

        let result = app.run(temp_dir.path(), &selector, &NullElementSource);
        assert!(matches!(result, Err(CxrExtractError::NoSelectionMade)));
    }

    #[test]
    fn test_run_skips_already_extracted_sequences() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shot.0001.cxr"), b"frame").unwrap();
        fs::write(temp_dir.path().join("shot.0002.cxr"), b"frame").unwrap();

        // All wildcard outputs already exist, so the bogus tool path is
        // never invoked and the run is clean.
        let sequence_dir = temp_dir.path().join("shot");
        fs::create_dir(&sequence_dir).unwrap();
        fs::write(sequence_dir.join("shot_ALL.0001.exr"), b"image").unwrap();
        fs::write(sequence_dir.join("shot_ALL.0002.exr"), b"image").unwrap();

        let app = quiet_app(bogus_tool_config());
        let report = app
            .run(temp_dir.path(), &CliSelection::default(), &NullElementSource)
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.sequences.len(), 1);
        assert_eq!(report.sequences[0].frames, 2);
        assert_eq!(report.sequences[0].first_frame, 1);
        assert_eq!(report.sequences[0].last_frame, 2);
    }

    #[test]
    fn test_run_records_sequence_failure_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("aaa.0001.cxr"), b"frame").unwrap();
        fs::write(temp_dir.path().join("bbb.0001.cxr"), b"frame").unwrap();

        // Only 'bbb' has its output pre-extracted; 'aaa' needs the tool,
        // which does not exist.
        let bbb_dir = temp_dir.path().join("bbb");
        fs::create_dir(&bbb_dir).unwrap();
        fs::write(bbb_dir.join("bbb_ALL.0001.exr"), b"image").unwrap();

        let app = quiet_app(bogus_tool_config());
        let report = app
            .run(temp_dir.path(), &CliSelection::default(), &NullElementSource)
            .unwrap();

        assert_eq!(report.sequences.len(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.succeeded_count(), 1);
        assert!(!report.is_clean());
        assert!(report.errors[0].contains("aaa"));
    }

    #[test]
    fn test_run_respects_shutdown_request() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shot.0001.cxr"), b"frame").unwrap();

        let app = quiet_app(bogus_tool_config());
        app.request_shutdown();

        let result = app.run(temp_dir.path(), &CliSelection::default(), &NullElementSource);
        assert!(matches!(result, Err(CxrExtractError::Cancelled)));
    }

    #[test]
    fn test_discover_groups_sequences() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shot.0002.cxr"), b"frame").unwrap();
        fs::write(temp_dir.path().join("shot.0001.cxr"), b"frame").unwrap();
        fs::write(temp_dir.path().join("other.0001.cxr"), b"frame").unwrap();

        let app = quiet_app(Config::default());
        let sequences = app.discover(temp_dir.path(), &NullElementSource).unwrap();

        assert_eq!(sequences.len(), 2);
        let frames: Vec<u32> = sequences["shot"].iter().map(|f| f.frame_number).collect();
        assert_eq!(frames, vec![1, 2]);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        CxrExtract::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[tool]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[selection]"));
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
