use crate::config::{CliOverrides, Config, ImageFormat};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cxr-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract render elements from Corona CXR frame sequences")]
#[command(
    long_about = "cxr-extract discovers rendered CXR frame sequences, lets you choose which \
                  sequences and render elements to extract, and drives the Corona Image Editor \
                  command-line tool to write each element as a separate image file per frame. \
                  Frames whose outputs already exist are skipped, so re-runs only do the \
                  remaining work."
)]
#[command(before_help = "🎬 CXR Extract - Render Element Extraction Tool")]
#[command(after_help = "EXAMPLES:\n  \
    cxr-extract scene.0001.cxr\n  \
    cxr-extract /path/to/renders/ --all\n  \
    cxr-extract /path/to/renders/ --elements Reflect,Refract --format jpg\n  \
    cxr-extract /path/to/renders/ --prefix extracted --overwrite\n\n\
    For more information, visit: https://github.com/user/cxr-extract")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input CXR file or directory
    #[arg(required_unless_present = "generate_config")]
    pub input: Option<PathBuf>,

    /// Path to the CoronaImageCmd executable
    #[arg(long, value_name = "PATH")]
    pub ciepath: Option<PathBuf>,

    /// Base directory for output folders (default: next to the source frames)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prefix for output folder names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Output image format
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Sequences to process (comma-separated; default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub sequences: Option<Vec<String>>,

    /// Elements to extract (comma-separated; default: all elements)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "all")]
    pub elements: Option<Vec<String>>,

    /// Extract all elements with a single wildcard pass per sequence
    #[arg(long)]
    pub all: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be extracted without executing)
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_tool_path(self.ciepath.clone())
            .with_format(self.format)
            .with_overwrite(self.overwrite)
            .with_prefix(self.prefix.clone())
            .with_output_dir(self.output.clone())
            .with_sequences(self.sequences.clone())
            .with_elements(self.elements.clone())
            .with_all_elements(self.all)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
