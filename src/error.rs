use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SweepError>;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Invalid search strategy: {0}")]
    InvalidSearch(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action '{action}' requires parameter '{parameter}'")]
    MissingParameter { action: String, parameter: String },

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File is in use: {}", .0.display())]
    Locked(PathBuf),

    #[error("Operation failed ({label}): {message}")]
    Function { label: String, message: String },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SweepError {
    pub fn exit_code(&self) -> i32 {
        2
    }

    /// Whether this error came from rule configuration rather than from
    /// touching the filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidSearch(_)
                | Self::UnknownAction(_)
                | Self::MissingParameter { .. }
                | Self::Regex(_)
                | Self::Pattern(_)
                | Self::Config(_)
        )
    }
}
