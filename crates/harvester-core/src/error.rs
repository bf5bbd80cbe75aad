use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("{} is not an existing directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Malformed filename '{filename}': {reason}")]
    MalformedFilename { filename: String, reason: String },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestError {
    /// True for errors that should be reported as a command-line usage problem.
    pub fn is_usage(&self) -> bool {
        matches!(self, HarvestError::NotADirectory(_))
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
