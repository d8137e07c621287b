use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final accounting of one extraction run: what was attempted per
/// sequence and how it went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub input_path: String,
    pub extraction_time: DateTime<Utc>,
    pub duration: Duration,
    pub sequences: Vec<SequenceOutcome>,
    pub errors: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceOutcome {
    pub name: String,
    pub frames: usize,
    pub first_frame: u32,
    pub last_frame: u32,
    pub elements: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub tool_path: String,
    pub output_format: String,
    pub overwrite: bool,
    pub prefix: Option<String>,
}

impl ConfigSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tool_path: config.tool.path.display().to_string(),
            output_format: config.output.format.to_string(),
            overwrite: config.output.overwrite,
            prefix: config.output.prefix.clone(),
        }
    }
}

impl ExtractionReport {
    pub fn new(
        input_path: String,
        duration: Duration,
        sequences: Vec<SequenceOutcome>,
        errors: Vec<String>,
        config_used: ConfigSnapshot,
    ) -> Self {
        Self {
            input_path,
            extraction_time: Utc::now(),
            duration,
            sequences,
            errors,
            config_used,
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.sequences.iter().filter(|s| s.succeeded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.sequences.iter().filter(|s| !s.succeeded).count()
    }

    pub fn total_frames(&self) -> usize {
        self.sequences.iter().map(|s| s.frames).sum()
    }

    /// True when every attempted sequence extracted cleanly.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.failed_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, succeeded: bool) -> SequenceOutcome {
        SequenceOutcome {
            name: name.to_string(),
            frames: 2,
            first_frame: 1,
            last_frame: 2,
            elements: "all elements".to_string(),
            succeeded,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = ExtractionReport::new(
            "/renders".to_string(),
            Duration::from_secs(3),
            vec![outcome("a", true), outcome("b", false), outcome("c", true)],
            vec!["Failed to extract sequence 'b'".to_string()],
            ConfigSnapshot::from_config(&Config::default()),
        );

        assert_eq!(report.succeeded_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.total_frames(), 6);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_report() {
        let report = ExtractionReport::new(
            "/renders".to_string(),
            Duration::from_secs(1),
            vec![outcome("a", true)],
            Vec::new(),
            ConfigSnapshot::from_config(&Config::default()),
        );

        assert!(report.is_clean());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = ExtractionReport::new(
            "/renders".to_string(),
            Duration::from_secs(1),
            vec![outcome("a", true)],
            Vec::new(),
            ConfigSnapshot::from_config(&Config::default()),
        );

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"input_path\""));
        assert!(json.contains("\"sequences\""));
        assert!(json.contains("\"config_used\""));
    }
}
