use crate::error::{CxrExtractError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default install location of the Corona Image Editor command-line tool.
pub const DEFAULT_TOOL_PATH: &str = r"C:\Program Files\Chaos\Corona\Corona Renderer for 3ds Max\Image Editor\CoronaImageCmd.exe";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub tool: ToolConfig,
    pub output: OutputConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolConfig {
    /// Path to the external conversion executable.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub format: ImageFormat,
    pub overwrite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Base directory for sequence output folders. `None` places each
    /// sequence folder next to its source frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Sequence names to process; empty selects every sequence.
    pub sequences: Vec<String>,
    /// Element names to extract; empty selects all elements.
    pub elements: Vec<String>,
    /// Force wildcard extraction even when `elements` is non-empty.
    pub all_elements: bool,
}

/// Output image format written by the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless OpenEXR output
    Exr,
    /// Lossy JPEG output
    Jpg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Exr => "exr",
            ImageFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            output: OutputConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TOOL_PATH),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Exr,
            overwrite: false,
            prefix: None,
            base_directory: None,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            sequences: Vec::new(),
            elements: Vec::new(),
            all_elements: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CxrExtractError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CxrExtractError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CxrExtractError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["cxr-extract.toml", ".cxr-extract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref tool_path) = cli_args.tool_path {
            self.tool.path = tool_path.clone();
        }

        if let Some(format) = cli_args.format {
            self.output.format = format;
        }

        if cli_args.overwrite {
            self.output.overwrite = true;
        }

        if let Some(ref prefix) = cli_args.prefix {
            self.output.prefix = Some(prefix.clone());
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = Some(output_dir.clone());
        }

        if let Some(ref sequences) = cli_args.sequences {
            self.selection.sequences = sequences.clone();
        }

        if let Some(ref elements) = cli_args.elements {
            self.selection.elements = elements.clone();
        }

        if cli_args.all_elements {
            self.selection.all_elements = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CxrExtractError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CxrExtractError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool.path.as_os_str().is_empty() {
            return Err(CxrExtractError::Config {
                message: "Conversion tool path must not be empty".to_string(),
            });
        }

        if self
            .selection
            .elements
            .iter()
            .any(|e| e.trim().is_empty())
        {
            return Err(CxrExtractError::Config {
                message: "Element names must not be empty".to_string(),
            });
        }

        if self
            .selection
            .sequences
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Err(CxrExtractError::Config {
                message: "Sequence names must not be empty".to_string(),
            });
        }

        if let Some(ref prefix) = self.output.prefix {
            if prefix.contains(['/', '\\']) {
                return Err(CxrExtractError::Config {
                    message: format!("Prefix must not contain path separators: {}", prefix),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub tool_path: Option<PathBuf>,
    pub format: Option<ImageFormat>,
    pub overwrite: bool,
    pub prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub sequences: Option<Vec<String>>,
    pub elements: Option<Vec<String>>,
    pub all_elements: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool_path(mut self, tool_path: Option<PathBuf>) -> Self {
        self.tool_path = tool_path;
        self
    }

    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_sequences(mut self, sequences: Option<Vec<String>>) -> Self {
        self.sequences = sequences;
        self
    }

    pub fn with_elements(mut self, elements: Option<Vec<String>>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_all_elements(mut self, all_elements: bool) -> Self {
        self.all_elements = all_elements;
        self
    }
}
