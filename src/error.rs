use thiserror::Error;

#[derive(Error, Debug)]
pub enum CxrExtractError {
    #[error("Filename '{name}' doesn't match pattern (name.####.ext)")]
    Naming { name: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("No CXR files found under: {path}")]
    NoFilesFound { path: String },

    #[error("No elements selected for any sequence")]
    NoSelectionMade,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CxrExtractError {
    fn user_message(&self) -> String {
        match self {
            CxrExtractError::Naming { name } => {
                format!("Filename '{}' doesn't match the expected pattern", name)
            }
            CxrExtractError::InvalidPath { path } => {
                format!("Invalid input path: {}", path)
            }
            CxrExtractError::NoFilesFound { path } => {
                format!("No CXR files found under: {}", path)
            }
            CxrExtractError::NoSelectionMade => {
                "No elements selected for any sequence".to_string()
            }
            CxrExtractError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CxrExtractError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CxrExtractError::Naming { .. } => Some(
                "Rendered frames must be named <sequence>.<4-digit frame>.cxr (e.g., shot.0001.cxr).".to_string(),
            ),
            CxrExtractError::NoFilesFound { .. } => Some(
                "Check that the path exists and contains .cxr files named <sequence>.<4-digit frame>.cxr.".to_string(),
            ),
            CxrExtractError::NoSelectionMade => Some(
                "Pass --all to extract every element, or --elements with names that exist in the source files (BEAUTY and Alpha are always available).".to_string(),
            ),
            CxrExtractError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CxrExtractError {
    fn from(error: toml::de::Error) -> Self {
        CxrExtractError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CxrExtractError>;
